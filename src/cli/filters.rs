//! Filter enums for list commands

use clap::ValueEnum;

use crate::entities::repair::RepairStatus;

/// Status filter for `repair list`
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Cotización only
    Cotizacion,
    /// Confirmado only
    Confirmado,
    /// En Reparación only
    EnReparacion,
    /// Reparado only
    Reparado,
    /// Entregado only
    Entregado,
    /// Everything not yet delivered
    Open,
    /// All statuses - default
    #[default]
    All,
}

impl StatusFilter {
    /// Check if a status matches this filter
    pub fn matches(&self, status: RepairStatus) -> bool {
        match self {
            StatusFilter::Open => status != RepairStatus::Entregado,
            StatusFilter::All => true,
            exact => exact.status() == Some(status),
        }
    }

    /// The single status this filter selects, if any
    pub fn status(&self) -> Option<RepairStatus> {
        match self {
            StatusFilter::Cotizacion => Some(RepairStatus::Cotizacion),
            StatusFilter::Confirmado => Some(RepairStatus::Confirmado),
            StatusFilter::EnReparacion => Some(RepairStatus::EnReparacion),
            StatusFilter::Reparado => Some(RepairStatus::Reparado),
            StatusFilter::Entregado => Some(RepairStatus::Entregado),
            StatusFilter::Open | StatusFilter::All => None,
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status() {
            Some(status) => write!(f, "{}", status),
            None if *self == StatusFilter::Open => write!(f, "open"),
            None => write!(f, "all"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filter_matches() {
        assert!(StatusFilter::Reparado.matches(RepairStatus::Reparado));
        assert!(!StatusFilter::Reparado.matches(RepairStatus::Entregado));
        assert!(StatusFilter::All.matches(RepairStatus::Entregado));
    }

    #[test]
    fn test_open_excludes_delivered() {
        for status in RepairStatus::ALL {
            assert_eq!(
                StatusFilter::Open.matches(status),
                status != RepairStatus::Entregado
            );
        }
    }
}
