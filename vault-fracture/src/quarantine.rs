//! Identity-divergence and echo-friction screening.
//!
//! IDI above the suspend threshold suspends a scar, above the quarantine
//! threshold quarantines it. Both remove it from active counts. Low echo
//! friction only flags the scar for review.

use vault_core::config::FractureConfig;
use vault_core::errors::VaultResult;
use vault_core::models::{QuarantineAction, QuarantineEvent};
use vault_core::{QuarantinePolicy, Scar};
use vault_store::ScarStore;

/// Action screening would take for `scar`, if any.
pub fn screen(scar: &Scar, config: &FractureConfig) -> Option<QuarantineAction> {
    let idi = scar.identity_divergence_index;
    if idi > config.suspend_idi_threshold {
        if scar.quarantine != Some(QuarantinePolicy::Suspend) {
            return Some(QuarantineAction::Suspend);
        }
    } else if idi > config.quarantine_idi_threshold && scar.quarantine.is_none() {
        return Some(QuarantineAction::Quarantine);
    }

    match scar.echo_friction {
        Some(echo) if echo < config.echo_friction_threshold && !scar.review_flagged => {
            Some(QuarantineAction::Review)
        }
        _ => None,
    }
}

fn reason(action: QuarantineAction, scar: &Scar, config: &FractureConfig) -> String {
    match action {
        QuarantineAction::Suspend => format!(
            "identity divergence {:.3} above suspend threshold {:.2}",
            scar.identity_divergence_index, config.suspend_idi_threshold
        ),
        QuarantineAction::Quarantine => format!(
            "identity divergence {:.3} above quarantine threshold {:.2}",
            scar.identity_divergence_index, config.quarantine_idi_threshold
        ),
        QuarantineAction::Review => format!(
            "echo friction {:.3} below {:.2}",
            scar.echo_friction.unwrap_or_default(),
            config.echo_friction_threshold
        ),
    }
}

/// Screen one stored scar and apply the resulting action.
pub fn screen_stored(
    store: &mut ScarStore,
    scar_id: &str,
    config: &FractureConfig,
    cycle: u64,
) -> VaultResult<Option<QuarantineEvent>> {
    let Some(scar) = store.get(scar_id) else {
        return Ok(None);
    };
    let Some(action) = screen(scar, config) else {
        return Ok(None);
    };

    let event = QuarantineEvent {
        scar_id: scar.scar_id.clone(),
        vault_id: store.vault_id(),
        idi: scar.identity_divergence_index,
        action,
        reason: reason(action, scar, config),
        cycle,
    };

    store.update(scar_id, |s| match action {
        QuarantineAction::Suspend => s.quarantine = Some(QuarantinePolicy::Suspend),
        QuarantineAction::Quarantine => s.quarantine = Some(QuarantinePolicy::Quarantine),
        QuarantineAction::Review => s.review_flagged = true,
    })?;

    Ok(Some(event))
}

/// Screen every scar in the store. Per-scar failures are logged and skipped.
pub fn sweep(store: &mut ScarStore, config: &FractureConfig, cycle: u64) -> Vec<QuarantineEvent> {
    let mut ids: Vec<String> = store
        .scars()
        .filter(|s| screen(s, config).is_some())
        .map(|s| s.scar_id.clone())
        .collect();
    ids.sort();

    let mut events = Vec::with_capacity(ids.len());
    for id in ids {
        match screen_stored(store, &id, config, cycle) {
            Ok(Some(event)) => events.push(event),
            Ok(None) => {}
            Err(e) => tracing::warn!(scar_id = %id, error = %e, "quarantine screening failed"),
        }
    }
    events
}
