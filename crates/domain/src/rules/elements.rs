//! Elemental damage types, their oppositions and affinities, and the
//! resistance/vulnerability/immunity arithmetic shared by combat and spellcasting.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    Fire,
    Cold,
    Lightning,
    Thunder,
    Acid,
    Poison,
    Radiant,
    Necrotic,
    Force,
    Psychic,
    Water,
    Earth,
    Wind,
    Bludgeoning,
    Piercing,
    Slashing,
}

/// Each element's natural opposite. Force opposes itself — there is no
/// element that cancels it out.
pub fn opposition(element: DamageType) -> DamageType {
    use DamageType::*;
    match element {
        Fire => Cold,
        Cold => Fire,
        Lightning => Earth,
        Earth => Lightning,
        Water => Fire,
        Wind => Earth,
        Acid => Radiant,
        Radiant => Necrotic,
        Necrotic => Radiant,
        Poison => Radiant,
        Thunder => Psychic,
        Psychic => Thunder,
        Force => Force,
        other => other,
    }
}

/// Elements that combine well with `element`. Not symmetric: check both
/// directions with [`are_elements_compatible`] when the order doesn't matter.
pub fn affinities(element: DamageType) -> &'static [DamageType] {
    use DamageType::*;
    match element {
        Fire => &[Wind, Lightning],
        Cold => &[Water, Wind],
        Lightning => &[Water, Wind],
        Water => &[Cold, Earth, Acid],
        Earth => &[Fire, Thunder],
        Wind => &[Fire, Lightning, Cold],
        Acid => &[Water, Poison],
        Thunder => &[Earth, Lightning],
        Poison => &[Acid, Wind],
        Radiant => &[Fire],
        Necrotic => &[Cold],
        Psychic => &[Force],
        Force => &[Wind, Psychic],
        _ => &[],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageModifier {
    Immune,
    Resistant,
    Vulnerable,
    Normal,
}

/// Resistance and vulnerability cancel each other out; immunity overrides both.
pub fn effective_damage(
    base_damage: i32,
    damage_type: DamageType,
    resistances: &[DamageType],
    vulnerabilities: &[DamageType],
    immunities: &[DamageType],
) -> (i32, DamageModifier) {
    if immunities.contains(&damage_type) {
        return (0, DamageModifier::Immune);
    }
    let resistant = resistances.contains(&damage_type);
    let vulnerable = vulnerabilities.contains(&damage_type);

    match (resistant, vulnerable) {
        (true, true) => (base_damage, DamageModifier::Normal),
        (true, false) => (base_damage / 2, DamageModifier::Resistant),
        (false, true) => (base_damage * 2, DamageModifier::Vulnerable),
        (false, false) => (base_damage, DamageModifier::Normal),
    }
}

pub fn are_elements_compatible(a: DamageType, b: DamageType) -> bool {
    if a == b {
        return true;
    }
    affinities(a).contains(&b) || affinities(b).contains(&a)
}

/// 1.0 mutual affinity, 0.7 one-way, 0.3 neutral, 0.0 opposed.
pub fn combination_affinity(a: DamageType, b: DamageType) -> f64 {
    if a == b {
        return 1.0;
    }
    if opposition(a) == b && a != b {
        return 0.0;
    }

    let a_lists_b = affinities(a).contains(&b);
    let b_lists_a = affinities(b).contains(&a);

    if a_lists_b && b_lists_a {
        1.0
    } else if a_lists_b || b_lists_a {
        0.7
    } else {
        0.3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use DamageType::*;

    #[test]
    fn immunity_zeroes_damage() {
        let (dmg, m) = effective_damage(20, Fire, &[], &[], &[Fire]);
        assert_eq!(dmg, 0);
        assert_eq!(m, DamageModifier::Immune);
    }

    #[test]
    fn resistance_and_vulnerability_cancel() {
        let (dmg, m) = effective_damage(20, Fire, &[Fire], &[Fire], &[]);
        assert_eq!(dmg, 20);
        assert_eq!(m, DamageModifier::Normal);
    }

    #[test]
    fn resistance_halves_floored() {
        let (dmg, _) = effective_damage(7, Cold, &[Cold], &[], &[]);
        assert_eq!(dmg, 3);
    }

    #[test]
    fn vulnerability_doubles() {
        let (dmg, _) = effective_damage(7, Cold, &[], &[Cold], &[]);
        assert_eq!(dmg, 14);
    }

    #[test]
    fn fire_and_cold_are_opposed() {
        assert_eq!(combination_affinity(Fire, Cold), 0.0);
    }

    #[test]
    fn force_opposes_itself_but_equal_elements_are_compatible() {
        assert_eq!(opposition(Force), Force);
        assert!(are_elements_compatible(Force, Force));
    }

    #[test]
    fn mutual_affinity_scores_highest() {
        assert_eq!(combination_affinity(Water, Cold), 1.0);
    }

    #[test]
    fn one_way_affinity_scores_point_seven() {
        // Fire lists Lightning, but Lightning does not list Fire.
        assert_eq!(combination_affinity(Fire, Lightning), 0.7);
    }
}
