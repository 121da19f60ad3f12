//! Fixed placement presets. The mascot never sits at arbitrary coordinates: every
//! placement is a [`Preset`], which resolves to CSS edge offsets ([`Anchor`]) with
//! exactly one horizontal and one vertical edge set.

/// Gap between a visible corner preset and the viewport edge.
const EDGE_MARGIN_PX: f64 = 24.0;
/// Fraction of the mascot left visible while peeking.
const PEEK_VISIBLE: f64 = 0.4;
/// Extra distance beyond the viewport for run start / end placements.
const OFFSCREEN_MARGIN_PX: f64 = 20.0;

/// `calc(percent% + px)` along one axis. Percent is relative to the viewport
/// dimension of that axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Length {
    pub percent: f64,
    pub px: f64,
}

impl Length {
    pub const fn px(px: f64) -> Self {
        Self { percent: 0.0, px }
    }

    pub const fn percent(percent: f64) -> Self {
        Self { percent, px: 0.0 }
    }

    pub fn resolve(&self, dimension: f64) -> f64 {
        self.percent * dimension / 100.0 + self.px
    }

    pub fn css(&self) -> String {
        match (self.percent == 0.0, self.px == 0.0) {
            (true, _) => format!("{}px", self.px),
            (false, true) => format!("{}%", self.percent),
            (false, false) if self.px < 0.0 => format!("calc({}% - {}px)", self.percent, -self.px),
            (false, false) => format!("calc({}% + {}px)", self.percent, self.px),
        }
    }
}

/// CSS edge offsets. Unset edges render as `auto`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    pub top: Option<Length>,
    pub right: Option<Length>,
    pub bottom: Option<Length>,
    pub left: Option<Length>,
}

impl Anchor {
    fn new(horizontal: HEdge, vertical: VEdge) -> Self {
        let (left, right) = match horizontal {
            HEdge::Left(l) => (Some(l), None),
            HEdge::Right(l) => (None, Some(l)),
        };
        let (top, bottom) = match vertical {
            VEdge::Top(l) => (Some(l), None),
            VEdge::Bottom(l) => (None, Some(l)),
        };
        Self { top, right, bottom, left }
    }

    pub fn css(&self) -> String {
        let edge = |l: &Option<Length>| l.map_or_else(|| "auto".to_owned(), |l| l.css());
        format!(
            "top:{};right:{};bottom:{};left:{};",
            edge(&self.top),
            edge(&self.right),
            edge(&self.bottom),
            edge(&self.left)
        )
    }

    /// Top-left corner of a `size`×`size` box placed with this anchor.
    pub fn origin(&self, size: f64, viewport: Viewport) -> (f64, f64) {
        let x = match (self.left, self.right) {
            (Some(l), _) => l.resolve(viewport.width),
            (None, Some(r)) => viewport.width - r.resolve(viewport.width) - size,
            (None, None) => 0.0,
        };
        let y = match (self.top, self.bottom) {
            (Some(t), _) => t.resolve(viewport.height),
            (None, Some(b)) => viewport.height - b.resolve(viewport.height) - size,
            (None, None) => 0.0,
        };
        (x, y)
    }
}

enum HEdge {
    Left(Length),
    Right(Length),
}

enum VEdge {
    Top(Length),
    Bottom(Length),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1280.0, height: 720.0 }
    }
}

/// The six visible resting spots used by hops, dodges and post-motion settling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
    TopRight,
    TopLeft,
    BottomRight,
    BottomLeft,
    MiddleRight,
    MiddleLeft,
}

impl Corner {
    pub const ALL: [Corner; 6] = [
        Corner::TopRight,
        Corner::TopLeft,
        Corner::BottomRight,
        Corner::BottomLeft,
        Corner::MiddleRight,
        Corner::MiddleLeft,
    ];
}

/// Screen edge the mascot peeks out from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    LeftToRight,
    RightToLeft,
}

/// Vertical lane of a run: 20% or 70% of the viewport height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Band {
    Upper,
    Lower,
}

impl Band {
    fn percent(self) -> f64 {
        match self {
            Band::Upper => 20.0,
            Band::Lower => 70.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Run {
    pub direction: Direction,
    pub band: Band,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    Corner(Corner),
    Peek(Side),
    RunStart(Run),
    RunEnd(Run),
}

impl Preset {
    /// Where the mascot rests on reveal and after a catch.
    pub const DEFAULT: Preset = Preset::Corner(Corner::TopRight);

    pub fn anchor(&self, size: f64) -> Anchor {
        let m = Length::px(EDGE_MARGIN_PX);
        let tucked = Length::px(-size * (1.0 - PEEK_VISIBLE));
        let offscreen = Length::px(-(size + OFFSCREEN_MARGIN_PX));
        let beyond = Length { percent: 100.0, px: OFFSCREEN_MARGIN_PX };
        match *self {
            Preset::Corner(c) => match c {
                Corner::TopRight => Anchor::new(HEdge::Right(m), VEdge::Top(m)),
                Corner::TopLeft => Anchor::new(HEdge::Left(m), VEdge::Top(m)),
                Corner::BottomRight => Anchor::new(HEdge::Right(m), VEdge::Bottom(m)),
                Corner::BottomLeft => Anchor::new(HEdge::Left(m), VEdge::Bottom(m)),
                Corner::MiddleRight => Anchor::new(HEdge::Right(m), VEdge::Top(Length::percent(45.0))),
                Corner::MiddleLeft => Anchor::new(HEdge::Left(m), VEdge::Top(Length::percent(45.0))),
            },
            Preset::Peek(side) => match side {
                Side::Right => Anchor::new(HEdge::Right(tucked), VEdge::Top(Length::percent(40.0))),
                Side::Left => Anchor::new(HEdge::Left(tucked), VEdge::Top(Length::percent(60.0))),
                Side::Top => Anchor::new(HEdge::Left(Length::percent(50.0)), VEdge::Top(tucked)),
                Side::Bottom => Anchor::new(HEdge::Right(Length::percent(30.0)), VEdge::Bottom(tucked)),
            },
            Preset::RunStart(run) => {
                let lane = VEdge::Top(Length::percent(run.band.percent()));
                match run.direction {
                    Direction::LeftToRight => Anchor::new(HEdge::Left(offscreen), lane),
                    Direction::RightToLeft => Anchor::new(HEdge::Right(offscreen), lane),
                }
            }
            Preset::RunEnd(run) => {
                let lane = VEdge::Top(Length::percent(run.band.percent()));
                match run.direction {
                    Direction::LeftToRight => Anchor::new(HEdge::Left(beyond), lane),
                    Direction::RightToLeft => Anchor::new(HEdge::Right(beyond), lane),
                }
            }
        }
    }

    /// Rendered center of a `size`×`size` mascot at this preset.
    pub fn center(&self, size: f64, viewport: Viewport) -> (f64, f64) {
        let (x, y) = self.anchor(size).origin(size, viewport);
        (x + size / 2.0, y + size / 2.0)
    }

    /// True when no part of the box overlaps the viewport horizontally.
    pub fn is_offscreen_x(&self, size: f64, viewport: Viewport) -> bool {
        let (x, _) = self.anchor(size).origin(size, viewport);
        x + size <= 0.0 || x >= viewport.width
    }
}
