//! Investment repository with immutable snapshots
//!
//! Readers take an `Arc<PortfolioSnapshot>` and keep a consistent view while
//! writers publish a fresh snapshot. Every mutation returns the snapshot it
//! produced.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use super::types::{Investment, SipPlan};
use crate::error::{EngineError, Result};

/// All declared investments keyed by scheme code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub schemes: BTreeMap<u32, Vec<Investment>>,
}

impl PortfolioSnapshot {
    pub fn investments(&self, scheme_code: u32) -> &[Investment] {
        self.schemes.get(&scheme_code).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find(&self, scheme_code: u32, id: &str) -> Option<&Investment> {
        self.investments(scheme_code).iter().find(|inv| inv.id() == id)
    }

    pub fn scheme_codes(&self) -> impl Iterator<Item = u32> + '_ {
        self.schemes.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.values().all(Vec::is_empty)
    }
}

/// Storage seam for user investments
pub trait InvestmentRepository: Send + Sync {
    /// Current immutable view
    fn snapshot(&self) -> Arc<PortfolioSnapshot>;

    /// Add a new investment; ids are unique per scheme
    fn add(&self, scheme_code: u32, investment: Investment) -> Result<Arc<PortfolioSnapshot>>;

    /// Replace the investment with the same id
    fn update(&self, scheme_code: u32, investment: Investment) -> Result<Arc<PortfolioSnapshot>>;

    fn remove(&self, scheme_code: u32, id: &str) -> Result<Arc<PortfolioSnapshot>>;

    /// Apply `edit` to one SIP and store the result as a single atomic
    /// update. Fails with `NotASip` when `id` names a lump sum.
    fn edit_sip(
        &self,
        scheme_code: u32,
        id: &str,
        edit: &dyn Fn(SipPlan) -> Result<SipPlan>,
    ) -> Result<Arc<PortfolioSnapshot>>;

    /// Mark one SIP installment as skipped
    fn skip_installment(&self, scheme_code: u32, id: &str, date: NaiveDate) -> Result<Arc<PortfolioSnapshot>> {
        self.edit_sip(scheme_code, id, &|plan| Ok(plan.with_skipped(date)))
    }

    /// Stop a SIP after `end_date`
    fn cancel_sip(&self, scheme_code: u32, id: &str, end_date: NaiveDate) -> Result<Arc<PortfolioSnapshot>> {
        self.edit_sip(scheme_code, id, &|plan| {
            if end_date < plan.start_date {
                return Err(EngineError::invalid_input("end_date", "before start_date"));
            }
            Ok(plan.cancelled(end_date))
        })
    }

    /// Change the SIP amount from `effective_date` onwards
    fn modify_sip_amount(
        &self,
        scheme_code: u32,
        id: &str,
        effective_date: NaiveDate,
        amount: f64,
    ) -> Result<Arc<PortfolioSnapshot>> {
        self.edit_sip(scheme_code, id, &|plan| Ok(plan.with_amount_change(effective_date, amount)))
    }
}

fn not_found(scheme_code: u32, id: &str) -> EngineError {
    EngineError::InvestmentNotFound {
        scheme_code,
        id: id.to_string(),
    }
}

/// Process-local repository
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    current: RwLock<Arc<PortfolioSnapshot>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: PortfolioSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Copy the current snapshot, apply `edit` and publish the result
    fn publish<F>(&self, edit: F) -> Result<Arc<PortfolioSnapshot>>
    where
        F: FnOnce(&mut PortfolioSnapshot) -> Result<()>,
    {
        let mut current = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut next = PortfolioSnapshot::clone(&current);
        edit(&mut next)?;
        let next = Arc::new(next);
        *current = Arc::clone(&next);
        Ok(next)
    }
}

impl InvestmentRepository for InMemoryRepository {
    fn snapshot(&self) -> Arc<PortfolioSnapshot> {
        let current = self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&current)
    }

    fn add(&self, scheme_code: u32, investment: Investment) -> Result<Arc<PortfolioSnapshot>> {
        investment.validate()?;
        self.publish(|snapshot| {
            let investments = snapshot.schemes.entry(scheme_code).or_default();
            if investments.iter().any(|inv| inv.id() == investment.id()) {
                return Err(EngineError::DuplicateInvestment {
                    scheme_code,
                    id: investment.id().to_string(),
                });
            }
            debug!("adding investment {} to scheme {}", investment.id(), scheme_code);
            investments.push(investment);
            Ok(())
        })
    }

    fn update(&self, scheme_code: u32, investment: Investment) -> Result<Arc<PortfolioSnapshot>> {
        investment.validate()?;
        self.publish(|snapshot| {
            let slot = snapshot
                .schemes
                .get_mut(&scheme_code)
                .and_then(|invs| invs.iter_mut().find(|inv| inv.id() == investment.id()))
                .ok_or_else(|| not_found(scheme_code, investment.id()))?;
            *slot = investment;
            Ok(())
        })
    }

    fn edit_sip(
        &self,
        scheme_code: u32,
        id: &str,
        edit: &dyn Fn(SipPlan) -> Result<SipPlan>,
    ) -> Result<Arc<PortfolioSnapshot>> {
        self.publish(|snapshot| {
            let slot = snapshot
                .schemes
                .get_mut(&scheme_code)
                .and_then(|invs| invs.iter_mut().find(|inv| inv.id() == id))
                .ok_or_else(|| not_found(scheme_code, id))?;
            let plan = slot
                .as_sip()
                .cloned()
                .ok_or_else(|| EngineError::NotASip(id.to_string()))?;
            let edited = Investment::Sip(edit(plan)?);
            edited.validate()?;
            *slot = edited;
            Ok(())
        })
    }

    fn remove(&self, scheme_code: u32, id: &str) -> Result<Arc<PortfolioSnapshot>> {
        self.publish(|snapshot| {
            let investments = snapshot
                .schemes
                .get_mut(&scheme_code)
                .ok_or_else(|| not_found(scheme_code, id))?;
            let before = investments.len();
            investments.retain(|inv| inv.id() != id);
            if investments.len() == before {
                return Err(not_found(scheme_code, id));
            }
            if investments.is_empty() {
                snapshot.schemes.remove(&scheme_code);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEME: u32 = 120503;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn repo() -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        repo.add(SCHEME, Investment::sip("s1", 1000.0, 5, d(2024, 1, 5))).unwrap();
        repo.add(SCHEME, Investment::lump_sum("l1", 5000.0, d(2024, 1, 10))).unwrap();
        repo
    }

    #[test]
    fn test_snapshots_are_immutable() {
        let repo = repo();
        let before = repo.snapshot();
        let after = repo.remove(SCHEME, "l1").unwrap();

        assert_eq!(before.investments(SCHEME).len(), 2);
        assert_eq!(after.investments(SCHEME).len(), 1);
        assert_eq!(repo.snapshot(), after);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let repo = repo();
        let err = repo.add(SCHEME, Investment::lump_sum("l1", 1.0, d(2024, 2, 1))).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateInvestment { .. }));
        // same id under another scheme is fine
        assert!(repo.add(100, Investment::lump_sum("l1", 1.0, d(2024, 2, 1))).is_ok());
    }

    #[test]
    fn test_sip_mutations() {
        let repo = repo();
        repo.skip_installment(SCHEME, "s1", d(2024, 3, 5)).unwrap();
        repo.modify_sip_amount(SCHEME, "s1", d(2024, 4, 1), 2500.0).unwrap();
        let snapshot = repo.cancel_sip(SCHEME, "s1", d(2024, 6, 5)).unwrap();

        let plan = snapshot.find(SCHEME, "s1").and_then(Investment::as_sip).unwrap();
        assert!(plan.is_skipped(d(2024, 3, 5)));
        assert_eq!(plan.amount_on(d(2024, 5, 5)), 2500.0);
        assert_eq!(plan.end_date, Some(d(2024, 6, 5)));
    }

    #[test]
    fn test_sip_operation_errors() {
        let repo = repo();
        assert!(matches!(
            repo.skip_installment(SCHEME, "l1", d(2024, 3, 5)),
            Err(EngineError::NotASip(_))
        ));
        assert!(matches!(
            repo.cancel_sip(SCHEME, "missing", d(2024, 3, 5)),
            Err(EngineError::InvestmentNotFound { .. })
        ));
        assert!(matches!(
            repo.cancel_sip(SCHEME, "s1", d(2023, 12, 1)),
            Err(EngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_concurrent_skips_are_all_kept() {
        let repo = repo();
        let threads = 8u64;
        let per_thread = 50u64;

        std::thread::scope(|scope| {
            for t in 0..threads {
                let repo = &repo;
                scope.spawn(move || {
                    for i in 0..per_thread {
                        let date = d(2024, 1, 5)
                            .checked_add_days(chrono::Days::new(t * per_thread + i))
                            .unwrap();
                        repo.skip_installment(SCHEME, "s1", date).unwrap();
                    }
                });
            }
        });

        let snapshot = repo.snapshot();
        let plan = snapshot.find(SCHEME, "s1").and_then(Investment::as_sip).unwrap();
        assert_eq!(plan.skipped_dates.len() as u64, threads * per_thread);
    }

    #[test]
    fn test_failed_mutation_leaves_snapshot() {
        let repo = repo();
        let before = repo.snapshot();
        assert!(repo.update(SCHEME, Investment::lump_sum("nope", 1.0, d(2024, 1, 1))).is_err());
        assert!(Arc::ptr_eq(&before, &repo.snapshot()));
    }

    #[test]
    fn test_remove_last_drops_scheme() {
        let repo = repo();
        repo.remove(SCHEME, "s1").unwrap();
        let snapshot = repo.remove(SCHEME, "l1").unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.scheme_codes().count(), 0);
    }
}
