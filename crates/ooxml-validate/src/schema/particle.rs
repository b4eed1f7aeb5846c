//! Particle expressions: the tagged content-model grammar that describes
//! how an element's children may be composed, and the single-pass matcher
//! that checks an ordered child list against one.

use ooxml_pack::QName;

/// `max` side of an occurrence range; `Unbounded` stands for XSD's
/// `unbounded`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaxOccurs {
    Bounded(u32),
    Unbounded,
}

impl MaxOccurs {
    fn allows(&self, count: u32) -> bool {
        match self {
            MaxOccurs::Bounded(max) => count <= *max,
            MaxOccurs::Unbounded => true,
        }
    }
}

/// A tagged content-model particle. `min`/`max` occurrence bounds live on
/// the variants that repeat as a unit; `Group`/`ElementRef`/`Any` are
/// resolved to their target before matching (§4.5).
#[derive(Clone, Debug)]
pub enum Particle {
    Sequence {
        children: Vec<Particle>,
        min: u32,
        max: MaxOccurs,
    },
    Choice {
        children: Vec<Particle>,
        min: u32,
        max: MaxOccurs,
    },
    All {
        children: Vec<Particle>,
    },
    Group {
        name: String,
        min: u32,
        max: MaxOccurs,
    },
    Any {
        namespace: Option<String>,
        min: u32,
        max: MaxOccurs,
    },
    ElementRef {
        name: QName,
        min: u32,
        max: MaxOccurs,
    },
}

/// The set of element-group tags a `Group` particle can be resolved
/// against, keyed by group name. Build-once, shared read-only (§9: no
/// global singleton — constructed explicitly during catalog setup).
pub type GroupTable = std::collections::HashMap<String, Particle>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticleViolation {
    MinOccursViolation { expected_names: Vec<String> },
    WrongElementOrder { expected_names: Vec<String>, found: String },
    MissingChoice { expected_names: Vec<String> },
    MaxOccursViolation { name: String },
    UnexpectedElement { name: String },
}

/// Result of matching a particle against a run of children starting at
/// some offset: how many children were consumed, and any violations.
struct MatchOutcome {
    consumed: usize,
    violations: Vec<ParticleViolation>,
}

/// Checks `children` (by their qualified display name, e.g. `p:sp`)
/// against `particle` in a single left-to-right pass. Returns every
/// violation found; an empty vector means the children are well-formed
/// against this particle.
pub fn check_children(
    particle: &Particle,
    children: &[QName],
    groups: &GroupTable,
) -> Vec<ParticleViolation> {
    let outcome = match_particle(particle, children, 0, groups);
    let mut violations = outcome.violations;
    if outcome.consumed < children.len() {
        violations.push(ParticleViolation::UnexpectedElement {
            name: children[outcome.consumed].display_with_prefix(),
        });
    }
    violations
}

fn match_particle(particle: &Particle, children: &[QName], at: usize, groups: &GroupTable) -> MatchOutcome {
    match particle {
        Particle::Sequence { children: subs, min, max } => {
            match_repeatable(subs, children, at, *min, *max, groups, true)
        }
        Particle::Choice { children: subs, min, max } => {
            match_choice(subs, children, at, *min, *max, groups)
        }
        Particle::All { children: subs } => match_all(subs, children, at, groups),
        Particle::Group { name, min, max } => match groups.get(name) {
            Some(target) => match_repeatable(std::slice::from_ref(target), children, at, *min, *max, groups, false),
            None => MatchOutcome { consumed: 0, violations: vec![] },
        },
        Particle::Any { min, max, .. } => {
            let mut count = 0u32;
            let mut pos = at;
            while pos < children.len() && max.allows(count + 1) {
                pos += 1;
                count += 1;
            }
            let mut violations = Vec::new();
            if count < *min {
                violations.push(ParticleViolation::MinOccursViolation { expected_names: vec!["*".into()] });
            }
            MatchOutcome { consumed: pos - at, violations }
        }
        Particle::ElementRef { name, min, max } => {
            let mut count = 0u32;
            let mut pos = at;
            while pos < children.len() && &children[pos] == name && max.allows(count + 1) {
                pos += 1;
                count += 1;
            }
            // An extra matching sibling beyond max is a max-occurs violation,
            // not silently left unconsumed (§8 boundary case).
            let mut violations = Vec::new();
            if pos < children.len() && &children[pos] == name {
                violations.push(ParticleViolation::MaxOccursViolation {
                    name: name.display_with_prefix(),
                });
            }
            if count < *min {
                violations.push(ParticleViolation::MinOccursViolation {
                    expected_names: vec![name.display_with_prefix()],
                });
            }
            MatchOutcome { consumed: (pos - at).min(max_as_u32(*max) as usize), violations }
        }
    }
}

fn max_as_u32(max: MaxOccurs) -> u64 {
    match max {
        MaxOccurs::Bounded(n) => n as u64,
        MaxOccurs::Unbounded => u64::MAX,
    }
}

fn match_repeatable(
    subs: &[Particle],
    children: &[QName],
    at: usize,
    min: u32,
    max: MaxOccurs,
    groups: &GroupTable,
    in_order: bool,
) -> MatchOutcome {
    let mut pos = at;
    let mut reps = 0u32;
    let mut violations = Vec::new();

    loop {
        if !max.allows(reps + 1) {
            break;
        }
        let before = pos;
        let mut rep_violations = Vec::new();
        let mut failed = false;
        for sub in subs {
            let outcome = match_particle(sub, children, pos, groups);
            if outcome.consumed == 0 && sub_requires_presence(sub) {
                if in_order {
                    rep_violations.push(ParticleViolation::MinOccursViolation {
                        expected_names: expected_names_of(sub),
                    });
                }
                failed = true;
                break;
            }
            pos += outcome.consumed;
            rep_violations.extend(outcome.violations);
        }
        if failed {
            violations.extend(rep_violations);
            break;
        }
        // Every sub-particle either consumed input or was itself optional:
        // this repetition is satisfied, even if it consumed nothing.
        violations.extend(rep_violations);
        reps += 1;
        if pos == before {
            // Zero-width repetition; repeating again would loop forever.
            break;
        }
    }

    if reps < min {
        violations.push(ParticleViolation::MinOccursViolation {
            expected_names: subs.iter().flat_map(expected_names_of).collect(),
        });
    }

    MatchOutcome { consumed: pos - at, violations }
}

fn match_choice(subs: &[Particle], children: &[QName], at: usize, min: u32, max: MaxOccurs, groups: &GroupTable) -> MatchOutcome {
    let mut pos = at;
    let mut reps = 0u32;
    let mut violations = Vec::new();

    'outer: loop {
        if !max.allows(reps + 1) {
            break;
        }
        for sub in subs {
            let outcome = match_particle(sub, children, pos, groups);
            if outcome.consumed > 0 {
                pos += outcome.consumed;
                violations.extend(outcome.violations);
                reps += 1;
                continue 'outer;
            }
        }
        break;
    }

    if reps == 0 && min >= 1 {
        violations.push(ParticleViolation::MissingChoice {
            expected_names: subs.iter().flat_map(expected_names_of).collect(),
        });
    }

    MatchOutcome { consumed: pos - at, violations }
}

fn match_all(subs: &[Particle], children: &[QName], at: usize, groups: &GroupTable) -> MatchOutcome {
    let mut consumed_total = 0usize;
    let mut pos = at;
    let mut matched = vec![false; subs.len()];
    let mut violations = Vec::new();

    // Unordered: try each remaining sub-particle against the next child
    // until none advances.
    loop {
        let mut advanced = false;
        for (i, sub) in subs.iter().enumerate() {
            if matched[i] {
                continue;
            }
            let outcome = match_particle(sub, children, pos, groups);
            if outcome.consumed > 0 {
                pos += outcome.consumed;
                consumed_total += outcome.consumed;
                violations.extend(outcome.violations);
                matched[i] = true;
                advanced = true;
                break;
            }
        }
        if !advanced {
            break;
        }
    }

    for (i, sub) in subs.iter().enumerate() {
        if !matched[i] && sub_requires_presence(sub) {
            violations.push(ParticleViolation::MinOccursViolation {
                expected_names: expected_names_of(sub),
            });
        }
    }

    MatchOutcome { consumed: consumed_total, violations }
}

fn sub_requires_presence(p: &Particle) -> bool {
    match p {
        Particle::Sequence { min, .. } | Particle::Choice { min, .. } => *min >= 1,
        Particle::All { .. } => true,
        Particle::Group { min, .. } => *min >= 1,
        Particle::Any { min, .. } => *min >= 1,
        Particle::ElementRef { min, .. } => *min >= 1,
    }
}

fn expected_names_of(p: &Particle) -> Vec<String> {
    match p {
        Particle::ElementRef { name, .. } => vec![name.display_with_prefix()],
        Particle::Any { .. } => vec!["*".to_string()],
        Particle::Group { name, .. } => vec![name.clone()],
        Particle::Sequence { children, .. } | Particle::Choice { children, .. } | Particle::All { children } => {
            children.iter().flat_map(expected_names_of).collect()
        }
    }
}
