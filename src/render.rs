//! Style and class directives handed to the host element each frame.

use crate::config::MascotSettings;
use crate::mascot::{MascotState, Motion};

const HOP_TRANSITION_MS: f64 = 600.0;
const DODGE_TRANSITION_MS: f64 = 200.0;
/// Slightly under the run hold so the crossing finishes before settling.
const RUN_TRANSITION_MS: f64 = 1_400.0;

#[derive(Clone, Debug, PartialEq)]
pub struct RenderDirectives {
    pub visible: bool,
    pub classes: Vec<&'static str>,
    pub style: String,
}

impl RenderDirectives {
    pub fn class_name(&self) -> String {
        self.classes.join(" ")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| *c == class)
    }
}

/// `launching` is set while a run sits at its start preset waiting for the
/// launch tick; that jump must not animate.
pub fn directives(state: &MascotState, settings: &MascotSettings, launching: bool) -> RenderDirectives {
    if !state.visible {
        return RenderDirectives {
            visible: false,
            classes: vec!["cupid", "cupid--hidden"],
            style: "display:none;".to_owned(),
        };
    }

    let mut classes = vec!["cupid"];
    if state.caught {
        classes.push("cupid--caught");
    } else {
        match state.motion {
            Motion::Peeking => classes.push("cupid--peeking"),
            Motion::Running => classes.push("cupid--running"),
            Motion::Dodging => classes.push("cupid--dodging"),
            Motion::Idle if settings.float_animation => classes.push("cupid--floating"),
            Motion::Idle => {}
        }
    }

    let size = settings.size;
    let speed = settings.speed;
    let transition = match (state.caught, state.motion) {
        (false, Motion::Running) if launching => "none".to_owned(),
        (false, Motion::Running) => {
            format!("all {}ms linear", (RUN_TRANSITION_MS / speed).min(RUN_TRANSITION_MS).round())
        }
        (false, Motion::Dodging) => format!("all {}ms ease-out", (DODGE_TRANSITION_MS / speed).round()),
        _ => format!("all {}ms ease-in-out", (HOP_TRANSITION_MS / speed).round()),
    };

    let style = format!(
        "position:fixed;{anchor}width:{size}px;height:{size}px;opacity:{opacity};\
         filter:drop-shadow(0 4px 8px rgba(0,0,0,{shadow}));transition:{transition};\
         z-index:1000;cursor:pointer;",
        anchor = state.position.anchor(size).css(),
        opacity = 1.0 - settings.transparency,
        shadow = settings.shadow_intensity,
    );

    RenderDirectives { visible: true, classes, style }
}
