//! Fee state store.
//!
//! The [`FeeStore`] owns the latest [`FeeSnapshot`] and publishes every change on a
//! [`watch`] channel. Each operation is a read-modify-write of the whole snapshot under the
//! channel lock, so writers always work against the latest state.

mod custom;
pub use custom::CustomGasFee;
use custom::preserve_custom;

mod events;
pub use events::{FeeEvents, TracingEvents};

mod wallet;
pub use wallet::{StaticWallet, WalletAssets};

use crate::{
    error::FeeError,
    pricing::{NativePrice, NormalizedFees, estimate_costs},
    selection::{resolve_option, select_fee},
    types::{FeeParam, FeeSnapshot, NativeCurrency, Network, Speed, WalletAsset},
};
use alloy::primitives::U256;
use chrono::Utc;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::watch;
use tracing::{debug, trace};

/// Whether the snapshot may drive the selected fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Fee data is complete.
    Ready,
    /// The network charges an L1 data fee that was not supplied yet.
    AwaitingL1Fee,
}

impl Readiness {
    /// Readiness of `snapshot`.
    pub fn of(snapshot: &FeeSnapshot) -> Self {
        let awaiting = snapshot.tx_network.is_some_and(|network| network.requires_l1_data_fee())
            && snapshot.l1_gas_fee_optimism.is_none();
        if awaiting { Self::AwaitingL1Fee } else { Self::Ready }
    }
}

/// Outcome of a snapshot write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Write {
    /// The write belonged to an ended session.
    Stale,
    /// Nothing changed, nothing was published.
    Unchanged,
    /// A new snapshot was published.
    Modified,
}

/// Holds the latest [`FeeSnapshot`].
///
/// Cheap to clone, clones share the same state.
#[derive(Debug, Clone)]
pub struct FeeStore {
    inner: Arc<FeeStoreInner>,
}

#[derive(Debug)]
struct FeeStoreInner {
    /// Latest snapshot.
    snapshot: watch::Sender<FeeSnapshot>,
    /// Current polling session, poll results of other sessions are discarded.
    session: AtomicU64,
    /// Wallet the selected fee is checked against.
    wallet: Arc<dyn WalletAssets>,
    /// Analytics and crash reporting sink.
    events: Arc<dyn FeeEvents>,
    /// Currency fee values are displayed in.
    currency: NativeCurrency,
}

impl FeeStore {
    /// Creates a new [`FeeStore`] with an empty snapshot.
    pub fn new(
        default_gas_limit: u64,
        wallet: Arc<dyn WalletAssets>,
        events: Arc<dyn FeeEvents>,
        currency: NativeCurrency,
    ) -> Self {
        let (snapshot, _) = watch::channel(FeeSnapshot::new(default_gas_limit));
        Self {
            inner: Arc::new(FeeStoreInner {
                snapshot,
                session: AtomicU64::new(0),
                wallet,
                events,
                currency,
            }),
        }
    }

    /// Returns a copy of the latest snapshot.
    pub fn snapshot(&self) -> FeeSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Subscribes to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<FeeSnapshot> {
        self.inner.snapshot.subscribe()
    }

    /// Readiness of the latest snapshot.
    pub fn readiness(&self) -> Readiness {
        Readiness::of(&self.inner.snapshot.borrow())
    }

    /// Current polling session.
    pub fn session(&self) -> u64 {
        self.inner.session.load(Ordering::SeqCst)
    }

    /// Starts a polling session for `network`, resetting the snapshot.
    pub fn begin_session(&self, network: Network) -> u64 {
        let mut session = 0;
        self.inner.snapshot.send_modify(|snapshot| {
            session = self.inner.session.fetch_add(1, Ordering::SeqCst) + 1;
            *snapshot = FeeSnapshot {
                tx_network: Some(network),
                ..FeeSnapshot::new(snapshot.default_gas_limit)
            };
        });
        debug!(session, %network, "Began fee session");
        session
    }

    /// Ends `session` and resets the snapshot. Returns `false` if `session` already ended.
    pub fn end_session(&self, session: u64) -> bool {
        let mut ended = false;
        self.inner.snapshot.send_if_modified(|snapshot| {
            ended = self
                .inner
                .session
                .compare_exchange(session, session + 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok();
            if ended {
                *snapshot = FeeSnapshot::new(snapshot.default_gas_limit);
            }
            ended
        });
        if ended {
            debug!(session, "Ended fee session");
        }
        ended
    }

    /// Sets the default gas limit and the current gas limit, then recomputes fees.
    pub fn set_default_gas_limit(&self, limit: u64) -> Result<(), FeeError> {
        let assets = self.inner.wallet.assets();
        self.write(None, |snapshot| {
            snapshot.default_gas_limit = limit;
            snapshot.gas_limit = Some(limit);
            self.refresh(snapshot, &assets, None)
        })?;
        Ok(())
    }

    /// Sets the gas limit of the pending transaction. Returns whether it changed.
    pub fn set_gas_limit(&self, limit: u64) -> Result<bool, FeeError> {
        if self.inner.snapshot.borrow().gas_limit == Some(limit) {
            return Ok(false);
        }
        self.recompute_tx_fee(Some(limit), None, None)
    }

    /// Recomputes the cost estimates and the selection.
    ///
    /// Stores `gas_limit` and `l1_data_fee` when given, the latter only on networks charging
    /// an L1 data fee. Without fee parameters only those are stored. Returns whether a new snapshot was published.
    pub fn recompute_tx_fee(
        &self,
        gas_limit: Option<u64>,
        override_option: Option<Speed>,
        l1_data_fee: Option<U256>,
    ) -> Result<bool, FeeError> {
        let assets = self.inner.wallet.assets();
        let write = self.write(None, |snapshot| {
            if let Some(gas_limit) = gas_limit {
                snapshot.gas_limit = Some(gas_limit);
            }
            if let Some(fee) = l1_data_fee {
                if snapshot.tx_network.is_some_and(|network| network.requires_l1_data_fee()) {
                    snapshot.l1_gas_fee_optimism = Some(FeeParam::from_wei(fee));
                } else {
                    debug!(network = ?snapshot.tx_network, %fee, "Ignoring L1 data fee");
                }
            }
            self.refresh(snapshot, &assets, override_option)
        })?;
        Ok(write == Write::Modified)
    }

    /// Merges a poll result of `session`.
    ///
    /// A user edited `custom` tier survives, only taking the new base fee. Returns `false`
    /// if `session` already ended, in which case nothing is written.
    pub fn apply_poll_result(&self, session: u64, fees: NormalizedFees) -> Result<bool, FeeError> {
        let assets = self.inner.wallet.assets();
        let write = self.write(Some(session), |snapshot| {
            let mut params = fees.params;
            if snapshot.custom_gas_fee_modified_by_user
                && let Some(previous) = &snapshot.gas_fee_params_by_speed
            {
                preserve_custom(&mut params, previous);
            }

            snapshot.gas_fee_params_by_speed = Some(params);
            snapshot.current_block_params = fees.current_block_params;
            snapshot.confirmation_time_by_priority_fee = fees.confirmation_times;
            snapshot.last_updated = Some(Utc::now());

            self.refresh(snapshot, &assets, None)
        })?;

        trace!(session, ?write, "Applied poll result");
        Ok(write != Write::Stale)
    }

    /// Replaces the `custom` tier with a user entered fee and selects it.
    pub fn apply_custom_fee(&self, custom: CustomGasFee) -> Result<(), FeeError> {
        let assets = self.inner.wallet.assets();
        self.write(None, |snapshot| {
            let confirmation_times = snapshot.confirmation_time_by_priority_fee.clone();
            let params =
                snapshot.gas_fee_params_by_speed.as_mut().ok_or(FeeError::FeesUnavailable)?;
            custom.apply(params, confirmation_times.as_ref())?;

            snapshot.custom_gas_fee_modified_by_user = true;
            self.refresh(snapshot, &assets, Some(Speed::Custom))
        })?;
        Ok(())
    }

    /// Selects `option`, checking sufficiency against `assets` if given, else the wallet.
    ///
    /// Selecting the already selected tier writes nothing and reports no event. Returns
    /// whether the selection changed.
    pub fn change_selected_option(
        &self,
        option: Speed,
        assets: Option<Vec<WalletAsset>>,
    ) -> Result<bool, FeeError> {
        if self.inner.snapshot.borrow().selected_option() == Some(option) {
            return Ok(false);
        }

        let assets = assets.unwrap_or_else(|| self.inner.wallet.assets());
        let mut network = None;
        let mut selected = option;
        let write = self.write(None, |snapshot| {
            if snapshot.selected_option() == Some(option) {
                return Ok(());
            }
            if snapshot.gas_fee_params_by_speed.is_none() {
                return Err(FeeError::FeesUnavailable);
            }

            self.refresh(snapshot, &assets, Some(option))?;
            network = snapshot.tx_network;
            selected = snapshot.selected_option().unwrap_or(option);
            Ok(())
        })?;

        if write != Write::Modified {
            return Ok(false);
        }
        self.inner.events.gas_fee_option_changed(network, selected);
        Ok(true)
    }

    /// Reports a failed poll of `network`.
    pub fn report_poll_failure(&self, network: Network, error: &FeeError) {
        self.inner.events.poll_failed(network, error);
    }

    /// Applies `f` to a copy of the latest snapshot and publishes it if it changed.
    ///
    /// With a `session`, nothing is written unless it is still the current one.
    fn write<F>(&self, session: Option<u64>, f: F) -> Result<Write, FeeError>
    where
        F: FnOnce(&mut FeeSnapshot) -> Result<(), FeeError>,
    {
        let mut outcome = Ok(Write::Stale);
        self.inner.snapshot.send_if_modified(|snapshot| {
            if session.is_some_and(|session| session != self.session()) {
                return false;
            }

            let mut next = snapshot.clone();
            if let Err(err) = f(&mut next) {
                outcome = Err(err);
                return false;
            }

            if next == *snapshot {
                outcome = Ok(Write::Unchanged);
                return false;
            }
            *snapshot = next;
            outcome = Ok(Write::Modified);
            true
        });
        outcome
    }

    /// Recomputes cost estimates and, unless the snapshot awaits an L1 data fee, the
    /// selection.
    ///
    /// An `override_option` is always selected. Without one the current selection, or
    /// [`Speed::Normal`], is refreshed.
    fn refresh(
        &self,
        snapshot: &mut FeeSnapshot,
        assets: &[WalletAsset],
        override_option: Option<Speed>,
    ) -> Result<(), FeeError> {
        let (Some(params), Some(network)) =
            (&snapshot.gas_fee_params_by_speed, snapshot.tx_network)
        else {
            return Ok(());
        };

        let price = NativePrice::from_assets(assets, network);
        let l1_data_fee = snapshot.l1_gas_fee_optimism.as_ref().map(FeeParam::amount);
        let fees = estimate_costs(
            params,
            snapshot.effective_gas_limit(),
            &price,
            &self.inner.currency,
            l1_data_fee,
        )?;

        let selection = if override_option.is_none()
            && Readiness::of(snapshot) == Readiness::AwaitingL1Fee
        {
            trace!(%network, "Awaiting L1 data fee, keeping selection");
            None
        } else {
            let option = resolve_option(params, override_option.or(snapshot.selected_option()));
            Some(select_fee(assets, params, &fees, option, network)?)
        };

        snapshot.gas_fees_by_speed = Some(fees);
        if let Some(selection) = selection {
            snapshot.is_sufficient_gas = Some(selection.is_sufficient_gas);
            snapshot.selected_gas_fee = Some(selection.selected_gas_fee);
        }
        Ok(())
    }
}
