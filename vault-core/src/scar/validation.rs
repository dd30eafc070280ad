use crate::errors::ValidationError;

use super::Scar;

/// Check a scar arriving from upstream before it may enter a store.
pub fn validate(scar: &Scar) -> Result<(), ValidationError> {
    if scar.scar_id.trim().is_empty() {
        return Err(ValidationError::MissingField { field: "scar_id" });
    }
    if scar.reason.trim().is_empty() {
        return Err(ValidationError::MissingField { field: "reason" });
    }
    if scar.geoid_refs.is_empty() || scar.geoid_refs.iter().any(|g| g.trim().is_empty()) {
        return Err(ValidationError::MissingField { field: "geoid_refs" });
    }

    let finite_fields = [
        ("pre_entropy", scar.pre_entropy),
        ("post_entropy", scar.post_entropy),
        ("delta_entropy", scar.delta_entropy),
        ("cls_angle", scar.cls_angle),
        ("semantic_polarity", scar.semantic_polarity),
        ("goal_impact", scar.goal_impact),
        ("contradiction_score", scar.contradiction_score),
        ("mutation_frequency", scar.mutation_frequency),
        ("identity_divergence_index", scar.identity_divergence_index),
    ];
    for (field, value) in finite_fields {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite { field });
        }
    }
    if scar.expression.features.values().any(|v| !v.is_finite()) {
        return Err(ValidationError::NonFinite { field: "expression" });
    }

    check_range("semantic_polarity", scar.semantic_polarity, -1.0, 1.0)?;
    check_range("contradiction_score", scar.contradiction_score, 0.0, 100.0)?;
    Ok(())
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}
