//! End-of-run summary of every entity's gameplay state.
use std::collections::BTreeMap;
use std::fmt;

use gameplay_core::GameplayState;
use gameplay_runtime::Simulation;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub steps: u64,
    pub entities: Vec<EntityReport>,
}

#[derive(Debug, Serialize)]
pub struct EntityReport {
    pub id: u32,
    pub attributes: BTreeMap<String, AttributeReport>,
    pub status_effects: Vec<String>,
    pub state_tags: Vec<String>,
    pub modifiers: usize,
}

#[derive(Debug, Serialize)]
pub struct AttributeReport {
    pub base: f32,
    pub current: f32,
}

impl SimulationReport {
    pub fn collect(simulation: &Simulation) -> Self {
        let entities = simulation
            .entities()
            .map(|(_, state)| EntityReport::from_state(&state.borrow()))
            .collect();
        Self {
            steps: simulation.current_step(),
            entities,
        }
    }
}

impl EntityReport {
    fn from_state(state: &GameplayState) -> Self {
        let attributes = state
            .attributes()
            .map(|attribute| {
                (
                    attribute.tag().to_string(),
                    AttributeReport {
                        base: attribute.base_value(),
                        current: attribute.current_value(),
                    },
                )
            })
            .collect();
        let mut status_effects: Vec<String> = state
            .status_effects()
            .map(|effect| effect.effect_tag().to_string())
            .collect();
        status_effects.sort();
        let mut state_tags: Vec<String> =
            state.state_tags().tags().map(ToString::to_string).collect();
        state_tags.sort();

        Self {
            id: state.entity().0,
            attributes,
            status_effects,
            state_tags,
            modifiers: state.modifier_count(),
        }
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "steps: {}", self.steps)?;
        for entity in &self.entities {
            writeln!(
                f,
                "entity #{} ({} modifiers, effects: [{}], tags: [{}])",
                entity.id,
                entity.modifiers,
                entity.status_effects.join(", "),
                entity.state_tags.join(", ")
            )?;
            for (tag, value) in &entity.attributes {
                writeln!(
                    f,
                    "  {tag:<24} base {:>8.2}  current {:>8.2}",
                    value.base, value.current
                )?;
            }
        }
        Ok(())
    }
}
