//! Toolbar state controller.
//!
//! Holds the declarative control list and a per-control state snapshot.
//! Tabs push sparse patches; controls absent from a patch keep their
//! state untouched. Every read hands out clones so no consumer can
//! reach back into controller-held state.

use log::error;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlValue {
    Text(String),
    Toggle(bool),
}

impl ControlValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ControlValue::Text(text) => Some(text),
            ControlValue::Toggle(_) => None,
        }
    }

    pub fn as_toggle(&self) -> Option<bool> {
        match self {
            ControlValue::Toggle(value) => Some(*value),
            ControlValue::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownOption {
    pub id: String,
    pub text: String,
    pub selected: bool,
}

impl DropdownOption {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), selected: false }
    }
}

/// Fields shared by every control variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlBase {
    pub id: String,
    pub tooltip: String,
    pub enabled: bool,
}

impl ControlBase {
    pub fn new(id: impl Into<String>, tooltip: impl Into<String>) -> Self {
        Self { id: id.into(), tooltip: tooltip.into(), enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarControl {
    Button { base: ControlBase, icon: String },
    Checkbox { base: ControlBase, icon: String, checked: bool },
    Dropdown { base: ControlBase, selected: String, options: Vec<DropdownOption> },
}

impl ToolbarControl {
    pub fn button(id: &str, tooltip: &str, icon: &str) -> Self {
        Self::Button { base: ControlBase::new(id, tooltip), icon: icon.to_owned() }
    }

    pub fn checkbox(id: &str, tooltip: &str, icon: &str, checked: bool) -> Self {
        Self::Checkbox { base: ControlBase::new(id, tooltip), icon: icon.to_owned(), checked }
    }

    pub fn dropdown(id: &str, tooltip: &str, selected: &str, options: Vec<DropdownOption>) -> Self {
        Self::Dropdown {
            base: ControlBase::new(id, tooltip),
            selected: selected.to_owned(),
            options,
        }
    }

    /// Marks the control disabled in its definition.
    pub fn disabled(mut self) -> Self {
        self.base_mut().enabled = false;
        self
    }

    pub fn base(&self) -> &ControlBase {
        match self {
            ToolbarControl::Button { base, .. }
            | ToolbarControl::Checkbox { base, .. }
            | ToolbarControl::Dropdown { base, .. } => base,
        }
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        match self {
            ToolbarControl::Button { base, .. }
            | ToolbarControl::Checkbox { base, .. }
            | ToolbarControl::Dropdown { base, .. } => base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }
}

/// Sparse per-control state. Fields left `None` in a patch keep the
/// retained value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlState {
    pub id: String,
    pub value: Option<ControlValue>,
    pub enabled: Option<bool>,
    pub options: Option<Vec<DropdownOption>>,
}

impl ControlState {
    pub fn with_value(id: impl Into<String>, value: ControlValue) -> Self {
        Self { id: id.into(), value: Some(value), enabled: None, options: None }
    }
}

pub type ToolbarState = BTreeMap<String, ControlState>;

/// A click reported by the rendered toolbar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlClick {
    pub id: String,
    pub value: Option<ControlValue>,
}

#[derive(Debug, Default)]
pub struct ToolbarController {
    controls: Vec<ToolbarControl>,
    state: ToolbarState,
}

impl ToolbarController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole control set and derives a fresh state snapshot.
    /// A dropdown with an empty selection defaults to its first option,
    /// and the default is written back into the control definition the
    /// way a native select shows its first entry.
    pub fn set_controls(&mut self, controls: Vec<ToolbarControl>) {
        self.controls = controls;
        self.state = ToolbarState::new();

        for control in &mut self.controls {
            let mut state = ControlState {
                id: control.id().to_owned(),
                value: None,
                enabled: Some(control.base().enabled),
                options: None,
            };

            match control {
                ToolbarControl::Button { .. } => {}
                ToolbarControl::Checkbox { checked, .. } => {
                    state.value = Some(ControlValue::Toggle(*checked));
                }
                ToolbarControl::Dropdown { selected, options, .. } => {
                    if selected.is_empty() {
                        if let Some(first) = options.first() {
                            *selected = first.id.clone();
                        }
                    }
                    mark_selected_option(options, selected);
                    state.value = Some(ControlValue::Text(selected.clone()));
                }
            }

            self.state.insert(state.id.clone(), state);
        }
    }

    /// Clones of the current control definitions.
    pub fn controls(&self) -> Vec<ToolbarControl> {
        self.controls.clone()
    }

    /// Clone of the current state snapshot.
    pub fn state(&self) -> ToolbarState {
        self.state.clone()
    }

    /// Merges a sparse patch onto the retained snapshot, then re-derives
    /// the control definitions. Controls missing from the patch are left
    /// byte-for-byte unchanged.
    pub fn apply_state(&mut self, patch: &ToolbarState) {
        for (id, retained) in &mut self.state {
            let Some(entry) = patch.get(id) else { continue };

            if let Some(value) = &entry.value {
                retained.value = Some(value.clone());
            }
            if let Some(enabled) = entry.enabled {
                retained.enabled = Some(enabled);
            }
            if let Some(options) = &entry.options {
                retained.options = Some(options.clone());
            }
        }

        self.update_control_states();
    }

    /// Updates the retained state for a clicked control *before* the
    /// click is forwarded, so immediate reads reflect the interaction.
    pub fn on_control_click(&mut self, click: &ControlClick) {
        match self.state.get_mut(&click.id) {
            Some(state) => state.value = click.value.clone(),
            None => error!("Click for unknown toolbar control '{}'", click.id),
        }
    }

    fn update_control_states(&mut self) {
        for control in &mut self.controls {
            let Some(state) = self.state.get(control.id()) else { continue };

            if let Some(enabled) = state.enabled {
                control.base_mut().enabled = enabled;
            }

            match control {
                ToolbarControl::Button { .. } => {}
                ToolbarControl::Checkbox { checked, .. } => {
                    if let Some(ControlValue::Toggle(value)) = &state.value {
                        *checked = *value;
                    }
                }
                ToolbarControl::Dropdown { selected, options, .. } => {
                    if let Some(ControlValue::Text(value)) = &state.value {
                        *selected = value.clone();
                    }
                    if let Some(new_options) = &state.options {
                        *options = new_options.clone();
                    }
                    mark_selected_option(options, selected);
                }
            }
        }
    }
}

fn mark_selected_option(options: &mut [DropdownOption], selected: &str) {
    for option in options {
        option.selected = option.id == selected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_controls() -> Vec<ToolbarControl> {
        vec![
            ToolbarControl::button("open", "Open a file", "icons/open.svg"),
            ToolbarControl::checkbox("wrap", "Toggle soft wrap", "icons/wrap.svg", true),
            ToolbarControl::dropdown(
                "stylesheets",
                "Stylesheets",
                "",
                vec![DropdownOption::new("x", "x.css"), DropdownOption::new("y", "y.css")],
            ),
        ]
    }

    #[test]
    fn empty_dropdown_selection_defaults_to_the_first_option() {
        let mut toolbar = ToolbarController::new();
        toolbar.set_controls(sample_controls());

        let controls = toolbar.controls();
        let ToolbarControl::Dropdown { selected, options, .. } = &controls[2] else {
            panic!("expected a dropdown");
        };

        assert_eq!(selected, "x");
        assert!(options[0].selected);
        assert!(!options[1].selected);

        let state = toolbar.state();
        assert_eq!(state["stylesheets"].value, Some(ControlValue::Text("x".to_owned())));
    }

    #[test]
    fn patches_leave_unmentioned_controls_untouched() {
        let mut toolbar = ToolbarController::new();
        toolbar.set_controls(sample_controls());

        let before = toolbar.state();

        let mut patch = ToolbarState::new();
        patch.insert(
            "stylesheets".to_owned(),
            ControlState::with_value("stylesheets", ControlValue::Text("y".to_owned())),
        );
        toolbar.apply_state(&patch);

        let after = toolbar.state();
        assert_eq!(after["open"], before["open"]);
        assert_eq!(after["wrap"], before["wrap"]);
        assert_eq!(after["stylesheets"].value, Some(ControlValue::Text("y".to_owned())));
    }

    #[test]
    fn patch_with_options_replaces_them_and_recomputes_selection_flags() {
        let mut toolbar = ToolbarController::new();
        toolbar.set_controls(sample_controls());

        let mut patch = ToolbarState::new();
        patch.insert(
            "stylesheets".to_owned(),
            ControlState {
                id: "stylesheets".to_owned(),
                value: Some(ControlValue::Text("z".to_owned())),
                enabled: Some(true),
                options: Some(vec![
                    DropdownOption::new("y", "y.css"),
                    DropdownOption::new("z", "z.css"),
                ]),
            },
        );
        toolbar.apply_state(&patch);

        let controls = toolbar.controls();
        let ToolbarControl::Dropdown { base, selected, options } = &controls[2] else {
            panic!("expected a dropdown");
        };

        assert!(base.enabled);
        assert_eq!(selected, "z");
        assert_eq!(options.len(), 2);
        assert!(!options[0].selected);
        assert!(options[1].selected);
    }

    #[test]
    fn checkbox_value_patch_becomes_checked() {
        let mut toolbar = ToolbarController::new();
        toolbar.set_controls(sample_controls());

        let mut patch = ToolbarState::new();
        patch.insert(
            "wrap".to_owned(),
            ControlState::with_value("wrap", ControlValue::Toggle(false)),
        );
        toolbar.apply_state(&patch);

        let controls = toolbar.controls();
        let ToolbarControl::Checkbox { checked, .. } = &controls[1] else {
            panic!("expected a checkbox");
        };
        assert!(!checked);
    }

    #[test]
    fn click_updates_retained_state_immediately() {
        let mut toolbar = ToolbarController::new();
        toolbar.set_controls(sample_controls());

        toolbar.on_control_click(&ControlClick {
            id: "stylesheets".to_owned(),
            value: Some(ControlValue::Text("y".to_owned())),
        });

        assert_eq!(
            toolbar.state()["stylesheets"].value,
            Some(ControlValue::Text("y".to_owned()))
        );
    }

    #[test]
    fn reads_are_isolated_from_caller_mutation() {
        let mut toolbar = ToolbarController::new();
        toolbar.set_controls(sample_controls());

        let mut controls = toolbar.controls();
        controls[0].base_mut().enabled = false;
        let mut state = toolbar.state();
        state.get_mut("open").expect("entry expected").enabled = Some(false);

        assert!(toolbar.controls()[0].base().enabled);
        assert_eq!(toolbar.state()["open"].enabled, Some(true));
    }
}
