//! Latent-pattern synthesis shared by compaction and the reactor variant.

use vault_core::{Expression, Scar, VaultId};

/// Circular mean of angles in degrees, normalized to [0, 360).
pub fn circular_mean_deg<I>(angles: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (mut sin, mut cos) = (0.0f64, 0.0f64);
    for a in angles {
        let r = a.to_radians();
        sin += r.sin();
        cos += r.cos();
    }
    if sin == 0.0 && cos == 0.0 {
        return 0.0;
    }
    sin.atan2(cos).to_degrees().rem_euclid(360.0)
}

fn mean<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let (sum, n) = values.into_iter().fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Build the scar that replaces a compacted cluster.
///
/// The result has a fresh id. Entropies, polarity, mutation frequency and IDI
/// are averaged, the angle by circular mean; drift depth and contradiction score take the max;
/// goal impact is summed.
pub fn synthesize_latent(members: &[&Scar], vault_id: VaultId, resolved_by: &str) -> Scar {
    let geoids: Vec<String> = members
        .iter()
        .flat_map(|s| s.geoid_refs.iter().cloned())
        .collect();
    let reason = format!("latent pattern of {} scars", members.len());

    let mut latent = Scar::new(
        geoids,
        reason,
        mean(members.iter().map(|s| s.pre_entropy)),
        mean(members.iter().map(|s| s.post_entropy)),
        circular_mean_deg(members.iter().map(|s| s.cls_angle)),
        mean(members.iter().map(|s| s.semantic_polarity)).clamp(-1.0, 1.0),
        vault_id,
    )
    .with_resolved_by(resolved_by)
    .with_expression(Expression::average(members.iter().map(|s| &s.expression)))
    .with_mutation_frequency(mean(members.iter().map(|s| s.mutation_frequency)))
    .with_identity_divergence(mean(members.iter().map(|s| s.identity_divergence_index)))
    .with_contradiction_score(
        members.iter().map(|s| s.contradiction_score).fold(0.0, f64::max),
    )
    .with_drift(
        members.iter().map(|s| s.drift_depth).max().unwrap_or(0),
        members.iter().any(|s| s.loop_active),
        members.iter().map(|s| s.goal_impact).sum(),
    );
    latent.delta_entropy = latent.post_entropy - latent.pre_entropy;
    latent
}
