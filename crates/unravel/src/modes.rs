//! Per-level decode modes.
//!
//! Each public level carries three flags: whether scalar literals may be
//! written at that level, and whether containers / indirections are replaced
//! wholesale or updated in place. Modes are immutable along a decode path;
//! overlays clone.

use std::fmt;

use crate::level::Level;

/// A single mode adjustment, applied in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOption {
    AllowLiteral,
    DisallowLiteral,
    ReplaceContainer,
    UpdateContainer,
    ReplaceIndirect,
    UpdateIndirect,
}

impl SetOption {
    /// Parse the set-tag spelling of an option.
    pub(crate) fn parse_tag(s: &str) -> Option<SetOption> {
        match s {
            "allowLiteral" => Some(SetOption::AllowLiteral),
            "disallowLiteral" => Some(SetOption::DisallowLiteral),
            "replaceContainer" => Some(SetOption::ReplaceContainer),
            "updateContainer" => Some(SetOption::UpdateContainer),
            "replaceIndirect" => Some(SetOption::ReplaceIndirect),
            "updateIndirect" => Some(SetOption::UpdateIndirect),
            _ => None,
        }
    }
}

impl fmt::Display for SetOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SetOption::AllowLiteral => "allowLiteral",
            SetOption::DisallowLiteral => "disallowLiteral",
            SetOption::ReplaceContainer => "replaceContainer",
            SetOption::UpdateContainer => "updateContainer",
            SetOption::ReplaceIndirect => "replaceIndirect",
            SetOption::UpdateIndirect => "updateIndirect",
        };
        f.write_str(name)
    }
}

/// Resolved flags for one level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetMode {
    pub allow_literal: bool,
    pub replace_container: bool,
    pub replace_indirect: bool,
}

impl SetMode {
    pub fn apply(&mut self, opt: SetOption) {
        match opt {
            SetOption::AllowLiteral => self.allow_literal = true,
            SetOption::DisallowLiteral => self.allow_literal = false,
            SetOption::ReplaceContainer => self.replace_container = true,
            SetOption::UpdateContainer => self.replace_container = false,
            SetOption::ReplaceIndirect => self.replace_indirect = true,
            SetOption::UpdateIndirect => self.replace_indirect = false,
        }
    }
}

/// Total mapping from public level to its mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelModes {
    modes: [SetMode; 5],
}

impl Default for LevelModes {
    /// Baseline: containers and indirections update in place everywhere,
    /// literals are allowed only at `Key` and `Value`.
    fn default() -> Self {
        let mut modes = [SetMode::default(); 5];
        modes[Self::slot(Level::Key)].allow_literal = true;
        modes[Self::slot(Level::Value)].allow_literal = true;
        LevelModes { modes }
    }
}

impl LevelModes {
    fn slot(level: Level) -> usize {
        match level {
            Level::Query => 0,
            Level::Field => 1,
            Level::Key => 2,
            Level::ValueList => 3,
            Level::Value => 4,
            // Internal levels carry no mode; callers gate on is_public.
            Level::Root | Level::KeyChain => 0,
        }
    }

    pub fn get(&self, level: Level) -> SetMode {
        if !level.is_public() {
            return SetMode::default();
        }
        self.modes[Self::slot(level)]
    }

    /// Clone with `opts` applied, in order, to one level.
    pub fn with(&self, level: Level, opts: &[SetOption]) -> LevelModes {
        let mut res = *self;
        if level.is_public() {
            let mode = &mut res.modes[Self::slot(level)];
            for opt in opts {
                mode.apply(*opt);
            }
        }
        res
    }

    /// Clone with a field's tag overrides applied. Options without an
    /// explicit level land on `default_level`.
    pub(crate) fn overlaid(&self, default_level: Level, ov: &Overrides) -> LevelModes {
        let mut res = self.with(default_level, &ov.default_level);
        for (level, opts) in &ov.per_level {
            res = res.with(*level, opts);
        }
        res
    }
}

/// Per-field mode overrides parsed from a set tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Overrides {
    /// Bare options; bound to the use site's default level.
    pub default_level: Vec<SetOption>,
    /// `level=option` items, in tag order.
    pub per_level: Vec<(Level, Vec<SetOption>)>,
}

impl Overrides {
    pub fn is_empty(&self) -> bool {
        self.default_level.is_empty() && self.per_level.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_allows_literals_at_key_and_value_only() {
        let modes = LevelModes::default();
        for level in Level::PUBLIC {
            let expected = matches!(level, Level::Key | Level::Value);
            assert_eq!(modes.get(level).allow_literal, expected, "{level}");
            assert!(!modes.get(level).replace_container, "{level}");
            assert!(!modes.get(level).replace_indirect, "{level}");
        }
    }

    #[test]
    fn options_apply_in_order() {
        let mut mode = SetMode::default();
        mode.apply(SetOption::AllowLiteral);
        mode.apply(SetOption::ReplaceContainer);
        mode.apply(SetOption::DisallowLiteral);
        assert!(!mode.allow_literal);
        assert!(mode.replace_container);
    }

    #[test]
    fn with_clones_and_leaves_other_levels_alone() {
        let base = LevelModes::default();
        let derived = base.with(Level::Query, &[SetOption::ReplaceContainer]);

        assert!(!base.get(Level::Query).replace_container);
        assert!(derived.get(Level::Query).replace_container);
        for level in [Level::Field, Level::Key, Level::ValueList, Level::Value] {
            assert_eq!(base.get(level), derived.get(level), "{level}");
        }
    }

    #[test]
    fn overlay_binds_bare_options_to_the_default_level() {
        let ov = Overrides {
            default_level: vec![SetOption::ReplaceContainer],
            per_level: vec![(Level::Value, vec![SetOption::DisallowLiteral])],
        };

        let modes = LevelModes::default().overlaid(Level::ValueList, &ov);
        assert!(modes.get(Level::ValueList).replace_container);
        assert!(!modes.get(Level::Value).allow_literal);
        assert!(!modes.get(Level::Query).replace_container);
    }

    #[test]
    fn internal_levels_have_no_mode() {
        let modes = LevelModes::default().with(Level::Root, &[SetOption::AllowLiteral]);
        assert_eq!(modes, LevelModes::default());
        assert_eq!(modes.get(Level::KeyChain), SetMode::default());
    }
}
