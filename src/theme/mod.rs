//! Per-slot color themes.
//!
//! A slot is colored either by a uniform theme (one color for the whole
//! structure) or by a custom per-index theme. Custom themes are backed by an
//! [`IndexColorTheme`] provider registered with the engine under a name
//! namespaced by viewer instance and slot, so two viewers never share a
//! registration. The provider's color data is updated in place, so changing
//! colors never re-registers.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::engine::SceneEngine;
use crate::error::EngineError;
use crate::scene::{Color, ColorAssignment, ThemeInputs};

/// Engine name of the built-in single-color theme.
pub const UNIFORM_THEME: &str = "uniform";

/// Namespace for custom per-index theme names.
pub const CUSTOM_THEME_PREFIX: &str = "viso-custom-theme";

/// A fully specified theme the engine can apply directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeRef {
    /// Registered theme name.
    pub name: String,
    /// Uniform color, or fallback for unassigned indices.
    pub base: Color,
}

impl ThemeRef {
    /// Uniform theme in `color`.
    #[must_use]
    pub fn uniform(color: Color) -> Self {
        Self {
            name: UNIFORM_THEME.to_owned(),
            base: color,
        }
    }

    /// Whether this is the built-in uniform theme.
    #[must_use]
    pub fn is_uniform(&self) -> bool {
        self.name == UNIFORM_THEME
    }
}

#[derive(Debug)]
struct IndexColorState {
    assignment: ColorAssignment,
    fallback: Color,
}

/// Custom color provider: maps element indices to colors, falling back to
/// a base color for indices without an assignment.
///
/// Clones share the same backing data, so the engine keeps seeing the
/// latest colors after the resolver updates them.
#[derive(Clone)]
pub struct IndexColorTheme {
    name: Rc<str>,
    state: Rc<RefCell<IndexColorState>>,
}

impl IndexColorTheme {
    fn new(name: String, assignment: ColorAssignment, fallback: Color) -> Self {
        Self {
            name: name.into(),
            state: Rc::new(RefCell::new(IndexColorState {
                assignment,
                fallback,
            })),
        }
    }

    /// Registered name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Color for an element index.
    #[must_use]
    pub fn color_at(&self, index: u32) -> Color {
        let state = self.state.borrow();
        state
            .assignment
            .get(&index)
            .copied()
            .unwrap_or(state.fallback)
    }

    fn replace(&self, assignment: &ColorAssignment, fallback: Color) -> IndexColorState {
        let next = IndexColorState {
            assignment: assignment.clone(),
            fallback,
        };
        std::mem::replace(&mut *self.state.borrow_mut(), next)
    }

    fn restore(&self, previous: IndexColorState) {
        *self.state.borrow_mut() = previous;
    }
}

impl fmt::Debug for IndexColorTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("IndexColorTheme")
            .field("name", &self.name)
            .field("assigned", &state.assignment.len())
            .field("fallback", &state.fallback)
            .finish()
    }
}

/// A theme ready to hand to the engine.
///
/// Resolving an already registered provider swaps its color data in place
/// before the engine sees the theme. If the engine then rejects the theme,
/// [`roll_back`](Self::roll_back) puts the previous data back.
#[derive(Debug)]
#[must_use]
pub struct ResolvedTheme {
    /// Theme to apply.
    pub theme: ThemeRef,
    previous: Option<(IndexColorTheme, IndexColorState)>,
}

impl ResolvedTheme {
    fn fresh(theme: ThemeRef) -> Self {
        Self {
            theme,
            previous: None,
        }
    }

    /// Restore the provider data this resolution replaced.
    pub fn roll_back(self) {
        if let Some((provider, previous)) = self.previous {
            provider.restore(previous);
        }
    }
}

/// Resolves slot theme inputs to [`ThemeRef`]s and owns the custom-theme
/// registrations made for one viewer instance.
#[derive(Debug)]
pub struct ThemeResolver {
    prefix: String,
    providers: FxHashMap<usize, IndexColorTheme>,
}

impl ThemeResolver {
    /// Resolver whose theme names are scoped to `instance_id`.
    #[must_use]
    pub fn new(instance_id: &str) -> Self {
        Self {
            prefix: format!("{CUSTOM_THEME_PREFIX}:{instance_id}"),
            providers: FxHashMap::default(),
        }
    }

    /// Custom theme name for a slot.
    #[must_use]
    pub fn theme_name(&self, slot: usize) -> String {
        format!("{}:{slot}", self.prefix)
    }

    /// Resolve a slot's theme.
    ///
    /// Without a non-empty color assignment this is a uniform theme in the
    /// base color (or `default_color`). With one, the slot's provider is
    /// registered on first use and its data replaced on later calls; call
    /// [`ResolvedTheme::roll_back`] if the engine fails to apply the result.
    ///
    /// # Errors
    ///
    /// Returns the engine's error if registering a new provider fails.
    pub fn resolve<E: SceneEngine>(
        &mut self,
        engine: &mut E,
        slot: usize,
        inputs: &ThemeInputs,
        default_color: Color,
    ) -> Result<ResolvedTheme, EngineError> {
        let base = inputs.base.unwrap_or(default_color);
        let Some(assignment) = inputs.assignment.as_ref().filter(|m| !m.is_empty()) else {
            return Ok(ResolvedTheme::fresh(ThemeRef::uniform(base)));
        };

        if let Some(provider) = self.providers.get(&slot) {
            let previous = provider.replace(assignment, base);
            return Ok(ResolvedTheme {
                theme: ThemeRef {
                    name: provider.name().to_owned(),
                    base,
                },
                previous: Some((provider.clone(), previous)),
            });
        }

        let provider = IndexColorTheme::new(self.theme_name(slot), assignment.clone(), base);
        engine.register_color_theme(&provider)?;
        log::debug!("registered color theme {}", provider.name());
        let name = provider.name().to_owned();
        let _ = self.providers.insert(slot, provider);
        Ok(ResolvedTheme::fresh(ThemeRef { name, base }))
    }

    /// Whether a slot has a registered custom provider.
    #[must_use]
    pub fn is_registered(&self, slot: usize) -> bool {
        self.providers.contains_key(&slot)
    }

    /// Names of every registration this resolver made, sorted.
    #[must_use]
    pub fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .providers
            .values()
            .map(|p| p.name().to_owned())
            .collect();
        names.sort();
        names
    }

    /// Unregister every provider this resolver created.
    pub fn release_all<E: SceneEngine>(&mut self, engine: &mut E) {
        for (_, provider) in self.providers.drain() {
            engine.unregister_color_theme(provider.name());
        }
    }

    /// Forget every provider without touching an engine (the engine that
    /// held them is already gone).
    pub fn forget_all(&mut self) {
        self.providers.clear();
    }
}
