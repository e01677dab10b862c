use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::operation::{Difficulty, Operation, OperationCategory, OperationRegistry};

/// Sprint modes drill one operation, Challenge modes mix several
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ModeCategory {
    Sprint,
    Challenge,
}

/// A named game configuration
#[derive(Debug, Clone)]
pub struct Mode {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Operation name, or a composite label for mixed modes
    pub operation_label: String,
    pub operations: Vec<Arc<dyn Operation>>,
    pub default_difficulty: Difficulty,
    pub default_duration: Duration,
    pub category: ModeCategory,
}

impl Mode {
    pub fn operation_names(&self) -> Vec<&'static str> {
        self.operations.iter().map(|op| op.name()).collect()
    }
}

/// A selectable game length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowedDuration {
    pub value: Duration,
    pub label: &'static str,
}

pub const ALLOWED_DURATIONS: [AllowedDuration; 4] = [
    AllowedDuration {
        value: Duration::from_secs(30),
        label: "30 seconds",
    },
    AllowedDuration {
        value: Duration::from_secs(60),
        label: "1 minute",
    },
    AllowedDuration {
        value: Duration::from_secs(90),
        label: "90 seconds",
    },
    AllowedDuration {
        value: Duration::from_secs(120),
        label: "2 minutes",
    },
];

/// Index of `d` in [`ALLOWED_DURATIONS`], or 0 when it is not one of them
pub fn find_duration_index(d: Duration) -> usize {
    ALLOWED_DURATIONS
        .iter()
        .position(|allowed| allowed.value == d)
        .unwrap_or(0)
}

/// How answers are entered during a game
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum InputMethod {
    #[default]
    Typing,
    #[strum(to_string = "Multiple Choice")]
    MultipleChoice,
}

impl InputMethod {
    pub const ALL: [InputMethod; 2] = [InputMethod::Typing, InputMethod::MultipleChoice];

    pub fn toggle(self) -> Self {
        match self {
            InputMethod::Typing => InputMethod::MultipleChoice,
            InputMethod::MultipleChoice => InputMethod::Typing,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

pub const DEFAULT_MODE_ID: &str = "addition";

/// Ordered lookup table of modes, populated once at startup
#[derive(Debug, Clone, Default)]
pub struct ModeRegistry {
    by_id: HashMap<String, Mode>,
    order: Vec<String>,
}

impl ModeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mode. Re-registering an id replaces the mode but keeps its
    /// original position.
    pub fn register(&mut self, mode: Mode) {
        let id = mode.id.clone();
        if self.by_id.insert(id.clone(), mode).is_none() {
            self.order.push(id);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Mode> {
        self.by_id.get(id)
    }

    pub fn all(&self) -> Vec<&Mode> {
        self.order
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .collect()
    }

    pub fn by_category(&self, category: ModeCategory) -> Vec<&Mode> {
        self.all()
            .into_iter()
            .filter(|mode| mode.category == category)
            .collect()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The built-in mode set
    pub fn with_presets(operations: &OperationRegistry) -> Self {
        let mut registry = Self::new();

        let sprints = [
            ("addition", "Addition", "Practice addition problems", "Addition"),
            ("subtraction", "Subtraction", "Practice subtraction problems", "Subtraction"),
            ("multiplication", "Multiplication", "Practice multiplication problems", "Multiplication"),
            ("division", "Division", "Practice division problems", "Division"),
            ("squares", "Squares", "Calculate n²", "Square"),
            ("cubes", "Cubes", "Calculate n³", "Cube"),
            ("square-roots", "Square Roots", "Calculate √n", "Square Root"),
            ("cube-roots", "Cube Roots", "Calculate ³√n", "Cube Root"),
            ("exponents", "Exponents", "Calculate aⁿ", "Power"),
            ("remainders", "Remainders", "Calculate a mod b", "Modulo"),
            ("percentages", "Percentages", "Calculate percentages", "Percentage"),
            ("factorials", "Factorials", "Calculate n!", "Factorial"),
        ];
        for (id, name, description, op) in sprints {
            registry.register(preset(
                id,
                name,
                description,
                op,
                operations.select(&[op]),
                ModeCategory::Sprint,
            ));
        }

        let challenges = [
            (
                "mixed-basics",
                "Mixed Basics",
                "Random mix of + − × ÷",
                "Basics",
                operations.by_category(OperationCategory::Basic),
            ),
            (
                "mixed-powers",
                "Mixed Powers",
                "Random mix of n² n³ √n ³√n",
                "Powers",
                operations.by_category(OperationCategory::Powers),
            ),
            (
                "mixed-advanced",
                "Mixed Advanced",
                "Random mix of mod % n! aⁿ",
                "Advanced",
                operations.by_category(OperationCategory::Advanced),
            ),
            (
                "anything-goes",
                "Anything Goes",
                "Random mix of all operations",
                "All",
                operations.all(),
            ),
        ];
        for (id, name, description, label, ops) in challenges {
            registry.register(preset(
                id,
                name,
                description,
                label,
                ops,
                ModeCategory::Challenge,
            ));
        }

        registry
    }
}

fn preset(
    id: &str,
    name: &str,
    description: &str,
    label: &str,
    operations: Vec<Arc<dyn Operation>>,
    category: ModeCategory,
) -> Mode {
    Mode {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        operation_label: label.to_string(),
        operations,
        default_difficulty: Difficulty::Medium,
        default_duration: Duration::from_secs(60),
        category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STABLE_IDS: [&str; 16] = [
        "addition",
        "subtraction",
        "multiplication",
        "division",
        "squares",
        "cubes",
        "square-roots",
        "cube-roots",
        "exponents",
        "remainders",
        "percentages",
        "factorials",
        "mixed-basics",
        "mixed-powers",
        "mixed-advanced",
        "anything-goes",
    ];

    fn presets() -> ModeRegistry {
        ModeRegistry::with_presets(&OperationRegistry::with_builtin())
    }

    #[test]
    fn presets_use_stable_ids_in_order() {
        assert_eq!(presets().ids(), STABLE_IDS.to_vec());
    }

    #[test]
    fn get_returns_the_registered_mode() {
        let registry = presets();
        for mode in registry.all() {
            let found = registry.get(&mode.id).unwrap();
            assert_eq!(found.id, mode.id);
            assert_eq!(found.name, mode.name);
            assert!(!found.operations.is_empty(), "{} has no operations", mode.id);
            assert!(!found.description.is_empty());
        }
    }

    #[test]
    fn unknown_and_empty_ids_are_not_found() {
        let registry = presets();
        assert!(registry.get("").is_none());
        assert!(registry.get("bogus").is_none());
        assert!(registry.get("Addition").is_none());
    }

    #[test]
    fn categories_partition_the_registry() {
        let registry = presets();
        let sprint = registry.by_category(ModeCategory::Sprint);
        let challenge = registry.by_category(ModeCategory::Challenge);

        assert!(sprint.iter().all(|m| m.operations.len() == 1));
        assert!(challenge.iter().all(|m| m.operations.len() > 1));
        assert_eq!(sprint.len() + challenge.len(), registry.len());
        assert!(sprint
            .iter()
            .all(|s| challenge.iter().all(|c| c.id != s.id)));
    }

    #[test]
    fn anything_goes_covers_every_operation() {
        let registry = presets();
        let mode = registry.get("anything-goes").unwrap();
        assert_eq!(mode.operations.len(), 12);
        assert_eq!(
            registry.get("mixed-basics").unwrap().operation_names(),
            vec!["Addition", "Subtraction", "Multiplication", "Division"]
        );
    }

    #[test]
    fn reregistering_keeps_position_and_replaces_entry() {
        let mut registry = presets();
        let mut replacement = registry.get("division").unwrap().clone();
        replacement.name = "Long Division".into();
        registry.register(replacement);

        assert_eq!(registry.len(), 16);
        assert_eq!(registry.ids()[3], "division");
        assert_eq!(registry.all()[3].name, "Long Division");
    }

    #[test]
    fn duration_index_defaults_to_first() {
        assert_eq!(find_duration_index(Duration::from_secs(90)), 2);
        assert_eq!(find_duration_index(Duration::from_secs(45)), 0);
        assert_eq!(find_duration_index(Duration::ZERO), 0);
    }

    #[test]
    fn input_method_names() {
        assert_eq!(InputMethod::default(), InputMethod::Typing);
        assert_eq!(InputMethod::MultipleChoice.to_string(), "Multiple Choice");
        assert_eq!(InputMethod::Typing.toggle(), InputMethod::MultipleChoice);
        assert_eq!(
            serde_json::to_string(&InputMethod::MultipleChoice).unwrap(),
            "\"multiple_choice\""
        );
    }
}
