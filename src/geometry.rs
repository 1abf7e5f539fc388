//! Instrument geometry: bore points, tone holes, mouthpiece, termination, and
//! the derived component chain the solver walks.
//!
//! Positions and diameters are in metres. Bore points and holes are kept
//! sorted by axial position, top (mouthpiece) first.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tuning::Fingering;

/// A point on the bore profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorePoint {
    #[serde(default)]
    pub name: Option<String>,
    pub position: f64,
    pub diameter: f64,
}

impl BorePoint {
    pub fn new(position: f64, diameter: f64) -> Self {
        Self {
            name: None,
            position,
            diameter,
        }
    }

    pub fn named(name: impl Into<String>, position: f64, diameter: f64) -> Self {
        Self {
            name: Some(name.into()),
            position,
            diameter,
        }
    }
}

/// Tone hole drilled through the bore wall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    #[serde(default)]
    pub name: Option<String>,
    pub position: f64,
    pub diameter: f64,
    /// Chimney height (wall thickness at the hole).
    pub height: f64,
    #[serde(default)]
    pub is_open: bool,
    /// Bore diameter at the hole position, set by `Instrument::update_components`.
    #[serde(skip)]
    pub bore_diameter: f64,
}

impl Hole {
    pub fn new(position: f64, diameter: f64, height: f64) -> Self {
        Self {
            name: None,
            position,
            diameter,
            height,
            is_open: false,
            bore_diameter: 0.0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Excitation mechanism at the top of the bore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MouthpieceKind {
    /// Duct flute window (whistle, recorder, native American flute).
    Fipple {
        window_length: f64,
        window_width: f64,
        /// Height of the window edge above the bore (wall thickness at the window).
        #[serde(default)]
        window_height: f64,
        /// Empirical scale on the window inertance; 1.0 for a plain window.
        #[serde(default = "default_fipple_factor")]
        fipple_factor: f64,
    },
    /// Transverse flute lip plate hole.
    EmbouchureHole { length: f64, width: f64, height: f64 },
    /// Reed or lip-driven mouthpiece, closed end at the excitation plane.
    Reed {
        /// Extra bore length equivalent to the reed and mouthpiece volume.
        #[serde(default)]
        length_correction: f64,
    },
}

fn default_fipple_factor() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mouthpiece {
    pub position: f64,
    pub kind: MouthpieceKind,
    /// Bore diameter at the mouthpiece, set by `Instrument::update_components`.
    #[serde(skip)]
    pub bore_diameter: f64,
    /// Bore above the mouthpiece, top first, closed at the top. Set by
    /// `Instrument::update_components`.
    #[serde(skip)]
    pub headspace: Vec<BoreSection>,
}

impl Mouthpiece {
    pub fn new(position: f64, kind: MouthpieceKind) -> Self {
        Self {
            position,
            kind,
            bore_diameter: 0.0,
            headspace: Vec::new(),
        }
    }

    /// True for flute-type mouthpieces, which sound at impedance minima.
    pub fn is_pressure_node(&self) -> bool {
        !matches!(self.kind, MouthpieceKind::Reed { .. })
    }
}

/// Open or closed far end of the bore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Termination {
    /// Outside diameter at the open end; a flange wider than the bore lengthens the end correction.
    #[serde(default)]
    pub flange_diameter: f64,
    #[serde(default)]
    pub closed: bool,
    /// Bottom bore diameter, set by `Instrument::update_components`.
    #[serde(skip)]
    pub bore_diameter: f64,
    /// Bottom bore position, set by `Instrument::update_components`.
    #[serde(skip)]
    pub position: f64,
}

impl Termination {
    pub fn open(flange_diameter: f64) -> Self {
        Self {
            flange_diameter,
            ..Default::default()
        }
    }

    pub fn closed() -> Self {
        Self {
            closed: true,
            ..Default::default()
        }
    }
}

/// Conical (or cylindrical) length of bore between two planes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoreSection {
    pub length: f64,
    /// Radius at the end nearer the mouthpiece.
    pub left_radius: f64,
    /// Radius at the end nearer the termination.
    pub right_radius: f64,
    pub right_position: f64,
}

/// One element of the acoustic chain, ordered from the mouthpiece down.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Mouthpiece(Mouthpiece),
    BoreSection(BoreSection),
    Hole(Hole),
}

/// A complete instrument: geometry plus the derived component chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    mouthpiece: Mouthpiece,
    bore_points: Vec<BorePoint>,
    #[serde(default)]
    holes: Vec<Hole>,
    #[serde(default)]
    termination: Termination,
    #[serde(skip)]
    components: Vec<Component>,
}

impl Instrument {
    pub fn new(
        name: impl Into<String>,
        mouthpiece: Mouthpiece,
        bore_points: Vec<BorePoint>,
        holes: Vec<Hole>,
        termination: Termination,
    ) -> Result<Self> {
        let mut instrument = Self {
            name: name.into(),
            mouthpiece,
            bore_points,
            holes,
            termination,
            components: Vec::new(),
        };
        instrument.validate()?;
        instrument.update_components();
        Ok(instrument)
    }

    /// Parse an instrument from JSON and build its component chain.
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: Instrument = serde_json::from_str(json)?;
        Self::new(
            parsed.name,
            parsed.mouthpiece,
            parsed.bore_points,
            parsed.holes,
            parsed.termination,
        )
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the geometry is physically meaningful.
    pub fn validate(&self) -> Result<()> {
        if self.bore_points.len() < 2 {
            return Err(Error::TooFewBorePoints(self.bore_points.len()));
        }
        for point in &self.bore_points {
            if !point.position.is_finite() || !(point.diameter > 0.0) {
                return Err(Error::InvalidGeometry(format!(
                    "bore point at {} has diameter {}",
                    point.position, point.diameter
                )));
            }
        }
        let (top, bottom) = self.bore_span();
        if !(bottom > top) {
            return Err(Error::InvalidGeometry("bore has zero length".to_string()));
        }
        let window = self.mouthpiece.position;
        if !(window >= top && window < bottom) {
            return Err(Error::InvalidGeometry(format!(
                "mouthpiece at {} lies outside the bore ({}..{})",
                window, top, bottom
            )));
        }
        for (i, hole) in self.holes.iter().enumerate() {
            if !(hole.diameter > 0.0) || hole.height < 0.0 {
                return Err(Error::InvalidGeometry(format!(
                    "hole {} has diameter {} and height {}",
                    i + 1,
                    hole.diameter,
                    hole.height
                )));
            }
            if hole.position <= window || hole.position >= bottom {
                return Err(Error::InvalidGeometry(format!(
                    "hole {} at {} lies outside the bore below the mouthpiece ({}..{})",
                    i + 1,
                    hole.position,
                    window,
                    bottom
                )));
            }
        }
        Ok(())
    }

    pub fn mouthpiece(&self) -> &Mouthpiece {
        &self.mouthpiece
    }

    pub fn termination(&self) -> &Termination {
        &self.termination
    }

    pub fn bore_points(&self) -> &[BorePoint] {
        &self.bore_points
    }

    /// Mutable access for geometry writers; call `update_components` afterwards.
    pub fn bore_points_mut(&mut self) -> &mut [BorePoint] {
        &mut self.bore_points
    }

    pub fn holes(&self) -> &[Hole] {
        &self.holes
    }

    /// Mutable access for geometry writers; call `update_components` afterwards.
    pub fn holes_mut(&mut self) -> &mut [Hole] {
        &mut self.holes
    }

    /// Derived chain: mouthpiece first, then bore sections and holes in axial order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Positions of the top and bottom bore points.
    pub fn bore_span(&self) -> (f64, f64) {
        let top = self
            .bore_points
            .iter()
            .map(|p| p.position)
            .fold(f64::INFINITY, f64::min);
        let bottom = self
            .bore_points
            .iter()
            .map(|p| p.position)
            .fold(f64::NEG_INFINITY, f64::max);
        (top, bottom)
    }

    /// Bore diameter at an axial position, linearly interpolated between bore
    /// points and clamped to the end diameters outside the bore.
    pub fn bore_diameter_at(&self, position: f64) -> f64 {
        interpolate_diameter(&self.bore_points, position)
    }

    /// Sort geometry and rebuild the component chain. Must be called after any
    /// change to bore points, holes, or the mouthpiece.
    pub fn update_components(&mut self) {
        self.bore_points
            .sort_by(|a, b| a.position.total_cmp(&b.position));
        self.holes.sort_by(|a, b| a.position.total_cmp(&b.position));

        for i in 0..self.holes.len() {
            let position = self.holes[i].position;
            self.holes[i].bore_diameter = interpolate_diameter(&self.bore_points, position);
        }

        let (Some(top), Some(bottom)) = (self.bore_points.first(), self.bore_points.last()) else {
            self.components.clear();
            return;
        };
        let (top_position, bottom) = (top.position, bottom.clone());

        // The chain starts at the mouthpiece; bore above it is headspace.
        let start = self.mouthpiece.position.max(top_position).min(bottom.position);
        let start_diameter = interpolate_diameter(&self.bore_points, start);
        self.mouthpiece.bore_diameter = start_diameter;
        self.mouthpiece.headspace = headspace_sections(&self.bore_points, start);
        self.termination.bore_diameter = bottom.diameter;
        self.termination.position = bottom.position;

        let mut components = Vec::with_capacity(2 * self.bore_points.len() + 2 * self.holes.len());
        components.push(Component::Mouthpiece(self.mouthpiece.clone()));

        let mut holes = self.holes.iter().peekable();
        let mut left_position = start;
        let mut left_diameter = start_diameter;

        for point in self.bore_points.iter().filter(|p| p.position > start) {
            while let Some(hole) = holes.peek() {
                if hole.position >= point.position {
                    break;
                }
                let hole_position = hole.position.max(left_position);
                push_section(
                    &mut components,
                    left_position,
                    left_diameter,
                    hole_position,
                    hole.bore_diameter,
                );
                components.push(Component::Hole((*hole).clone()));
                left_position = hole_position;
                left_diameter = hole.bore_diameter;
                holes.next();
            }
            push_section(
                &mut components,
                left_position,
                left_diameter,
                point.position,
                point.diameter,
            );
            left_position = point.position;
            left_diameter = point.diameter;
        }
        // Holes at or beyond the bottom point sit just above the termination.
        for hole in holes {
            components.push(Component::Hole(hole.clone()));
        }

        self.components = components;
    }

    /// Open or close holes to match a fingering. Hole states are listed top to bottom.
    pub fn set_open_holes(&mut self, fingering: &Fingering) -> Result<()> {
        if fingering.open_holes.len() != self.holes.len() {
            return Err(Error::FingeringMismatch {
                name: fingering.note.name.clone(),
                expected: self.holes.len(),
                actual: fingering.open_holes.len(),
            });
        }
        for (hole, &open) in self.holes.iter_mut().zip(fingering.open_holes.iter()) {
            hole.is_open = open;
        }
        let mut states = fingering.open_holes.iter();
        for component in self.components.iter_mut() {
            if let Component::Hole(hole) = component {
                if let Some(&open) = states.next() {
                    hole.is_open = open;
                }
            }
        }
        Ok(())
    }

    /// Position of the lowest tone hole, if any.
    pub fn bottom_hole_position(&self) -> Option<f64> {
        self.holes
            .iter()
            .map(|h| h.position)
            .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |a| a.max(p))))
    }
}

fn push_section(
    components: &mut Vec<Component>,
    left_position: f64,
    left_diameter: f64,
    right_position: f64,
    right_diameter: f64,
) {
    let length = right_position - left_position;
    if length <= 0.0 {
        return;
    }
    components.push(Component::BoreSection(BoreSection {
        length,
        left_radius: 0.5 * left_diameter,
        right_radius: 0.5 * right_diameter,
        right_position,
    }));
}

/// Sections of bore between the top point and `end`, top first.
fn headspace_sections(points: &[BorePoint], end: f64) -> Vec<BoreSection> {
    let mut sections = Vec::new();
    for pair in points.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if a.position >= end {
            break;
        }
        let right_position = b.position.min(end);
        let length = right_position - a.position;
        if length <= 0.0 {
            continue;
        }
        sections.push(BoreSection {
            length,
            left_radius: 0.5 * a.diameter,
            right_radius: 0.5 * interpolate_diameter(points, right_position),
            right_position,
        });
    }
    sections
}

fn interpolate_diameter(points: &[BorePoint], position: f64) -> f64 {
    let Some(first) = points.first() else {
        return 0.0;
    };
    if position <= first.position {
        return first.diameter;
    }
    for pair in points.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if position <= b.position {
            let span = b.position - a.position;
            if span <= 0.0 {
                return b.diameter;
            }
            let t = (position - a.position) / span;
            return a.diameter + t * (b.diameter - a.diameter);
        }
    }
    points[points.len() - 1].diameter
}
