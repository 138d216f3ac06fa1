use common::Freelancer;

/// Figures shown on the dashboard's stat cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: usize,
    pub available: usize,
    /// Whole percent; 0 when nothing is loaded.
    pub availability_rate: u32,
}

impl DashboardStats {
    pub fn from_freelancers(freelancers: &[Freelancer]) -> Self {
        let total = freelancers.len();
        let available = freelancers.iter().filter(|f| f.available).count();
        Self {
            total,
            available,
            availability_rate: availability_rate(available, total),
        }
    }
}

fn availability_rate(available: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (available as f64 / total as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freelancers(availability: &[bool]) -> Vec<Freelancer> {
        availability
            .iter()
            .enumerate()
            .map(|(i, &available)| Freelancer {
                id: i as i64,
                name: format!("Freelancer {i}"),
                location: "Remote".to_string(),
                timezone: "UTC".to_string(),
                hourly_rate: 40.0,
                rating: 4.0,
                available,
                skills: vec![],
            })
            .collect()
    }

    #[test]
    fn test_three_of_four_available() {
        let stats = DashboardStats::from_freelancers(&freelancers(&[true, true, false, true]));
        assert_eq!(stats.total, 4);
        assert_eq!(stats.available, 3);
        assert_eq!(stats.availability_rate, 75);
    }

    #[test]
    fn test_empty_list_rate_is_zero() {
        let stats = DashboardStats::from_freelancers(&[]);
        assert_eq!(
            stats,
            DashboardStats {
                total: 0,
                available: 0,
                availability_rate: 0
            }
        );
    }

    #[test]
    fn test_rate_rounds_to_nearest_percent() {
        assert_eq!(availability_rate(1, 3), 33);
        assert_eq!(availability_rate(2, 3), 67);
        assert_eq!(availability_rate(1, 8), 13);
        assert_eq!(availability_rate(0, 5), 0);
        assert_eq!(availability_rate(5, 5), 100);
    }
}
