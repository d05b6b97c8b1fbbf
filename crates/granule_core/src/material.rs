//! # Materials and the Type Registry
//!
//! Every cell stores a one-byte material id. The registry maps those ids back
//! to immutable [`Material`] definitions and compiles each material's movement
//! plan once, so the tick loop never touches a string.
//!
//! ## Id Assignment
//!
//! ```text
//! register([air, wall, water, sand, gas])
//!            0     1      2     3    4
//! ```
//!
//! `air` must sit at id 0: the next generation is zero-filled every tick and
//! a zeroed cell has to read back as empty space.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use rand::RngCore;

use crate::error::{SimError, SimResult};
use crate::grid::Grid;

/// Name of the mandatory background material.
pub const AIR_NAME: &str = "air";

/// Maximum number of materials a registry can hold (ids are one byte).
pub const MAX_MATERIALS: usize = 256;

/// Dense material id, equal to the material's position in the registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaterialId(u8);

impl MaterialId {
    /// The background material.
    pub const AIR: Self = Self(0);

    /// Wraps a raw id byte.
    #[inline]
    #[must_use]
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// Returns the raw id byte.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Returns the id as a registry index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// An 8-bit RGBA pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba {
    /// CSS `black`.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// CSS `silver`.
    pub const SILVER: Self = Self::rgb(192, 192, 192);
    /// CSS `lime`.
    pub const LIME: Self = Self::rgb(0, 255, 0);
    /// CSS `yellow`.
    pub const YELLOW: Self = Self::rgb(255, 255, 0);

    /// Creates an opaque color.
    #[inline]
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Maps a cell's aux byte to its display color.
pub type ColorFn = fn(u8) -> Rgba;

/// Free-form update behavior: `(grid, rng, x, y, aux)`.
pub type UpdateFn = fn(&mut Grid, &mut dyn RngCore, i32, i32, u8);

/// One axis of a candidate move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// A constant offset.
    Fixed(i32),
    /// The horizontal bias (+1 or -1) drawn for this invocation.
    BiasX,
    /// The vertical bias (+1 or -1) drawn for this invocation.
    BiasY,
}

impl Step {
    /// Resolves the step against this invocation's biases.
    #[inline]
    #[must_use]
    pub const fn resolve(self, bias_x: i32, bias_y: i32) -> i32 {
        match self {
            Self::Fixed(offset) => offset,
            Self::BiasX => bias_x,
            Self::BiasY => bias_y,
        }
    }

    /// Whether resolving this step needs a random draw.
    #[inline]
    #[must_use]
    pub const fn is_biased(self) -> bool {
        !matches!(self, Self::Fixed(_))
    }
}

/// A candidate offset-move: swap with `(x + dx, y + dy)` if it holds one of `into`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Move {
    /// Column offset.
    pub dx: Step,
    /// Row offset (positive is down).
    pub dy: Step,
    /// Material names this move may displace.
    pub into: Vec<String>,
}

impl Move {
    /// Creates a move.
    #[must_use]
    pub fn new(dx: Step, dy: Step, into: &[&str]) -> Self {
        Self {
            dx,
            dy,
            into: into.iter().map(|name| (*name).to_owned()).collect(),
        }
    }
}

/// How a material updates each tick.
#[derive(Clone, Debug)]
pub enum Behavior {
    /// No update at all; the cell becomes whatever overwrites it.
    Inert,
    /// Try each move in order, stopping at the first success; otherwise
    /// write the cell back in place. An empty list never moves.
    Moves(Vec<Move>),
    /// Arbitrary update logic against the grid.
    Custom(UpdateFn),
}

/// An immutable material definition.
#[derive(Clone, Debug)]
pub struct Material {
    name: String,
    color: ColorFn,
    behavior: Behavior,
}

impl Material {
    /// Creates a material definition.
    #[must_use]
    pub fn new(name: impl Into<String>, color: ColorFn, behavior: Behavior) -> Self {
        Self {
            name: name.into(),
            color,
            behavior,
        }
    }

    /// The material's unique name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Color for a cell of this material carrying `aux`.
    #[inline]
    #[must_use]
    pub fn color(&self, aux: u8) -> Rgba {
        (self.color)(aux)
    }

    /// The material's update behavior.
    #[inline]
    #[must_use]
    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }
}

/// A set of material ids, one bit per possible id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MaterialSet {
    bits: [u64; 4],
}

impl MaterialSet {
    /// The empty set.
    pub const EMPTY: Self = Self { bits: [0; 4] };

    /// Returns true if `id` is a member.
    #[inline]
    #[must_use]
    pub const fn contains(&self, id: MaterialId) -> bool {
        let raw = id.raw();
        (self.bits[(raw >> 6) as usize] >> (raw & 63)) & 1 == 1
    }

    /// Adds `id` to the set.
    #[inline]
    pub fn insert(&mut self, id: MaterialId) {
        let raw = id.raw();
        self.bits[(raw >> 6) as usize] |= 1u64 << (raw & 63);
    }

    /// Returns the set with `id` added.
    #[inline]
    #[must_use]
    pub fn with(mut self, id: MaterialId) -> Self {
        self.insert(id);
        self
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Returns true if the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&word| word == 0)
    }
}

/// A [`Move`] with its candidate names resolved to ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompiledMove {
    /// Column offset.
    pub dx: Step,
    /// Row offset.
    pub dy: Step,
    /// Materials this move may displace.
    pub into: MaterialSet,
}

/// A material's behavior as the rules engine executes it.
#[derive(Clone, Debug)]
pub enum Plan {
    /// No update.
    Inert,
    /// Ordered moves with a write-back fallback.
    Moves {
        /// Candidate moves in priority order.
        moves: Box<[CompiledMove]>,
        /// Whether any move needs the random biases.
        biased: bool,
    },
    /// Free-form update function.
    Custom(UpdateFn),
}

struct Entry {
    material: Material,
    plan: Plan,
}

/// Read-only mapping between material names, ids and definitions.
///
/// Built once by [`TypeRegistry::register`] and never mutated afterwards.
pub struct TypeRegistry {
    entries: Vec<Entry>,
    by_name: HashMap<String, MaterialId>,
}

impl TypeRegistry {
    /// Registers an ordered material list; each material's id is its position.
    ///
    /// # Errors
    ///
    /// - [`SimError::TooManyMaterials`] past 256 entries
    /// - [`SimError::DuplicateMaterialName`] if two materials share a name
    /// - [`SimError::MissingAirMaterial`] if no material is named `air`
    /// - [`SimError::MisplacedAirMaterial`] if `air` is not first
    pub fn register(materials: Vec<Material>) -> SimResult<Self> {
        if materials.len() > MAX_MATERIALS {
            return Err(SimError::TooManyMaterials {
                count: materials.len(),
            });
        }

        let mut by_name = HashMap::with_capacity(materials.len());
        for (index, material) in materials.iter().enumerate() {
            let id = MaterialId::new(index as u8);
            if by_name.insert(material.name.clone(), id).is_some() {
                return Err(SimError::DuplicateMaterialName(material.name.clone()));
            }
        }

        match by_name.get(AIR_NAME) {
            None => return Err(SimError::MissingAirMaterial),
            Some(&id) if id != MaterialId::AIR => {
                return Err(SimError::MisplacedAirMaterial { index: id.index() });
            }
            Some(_) => {}
        }

        let mut registry = Self {
            entries: Vec::with_capacity(materials.len()),
            by_name,
        };
        for material in materials {
            let plan = registry.compile(material.behavior());
            registry.entries.push(Entry { material, plan });
        }

        tracing::debug!(materials = registry.entries.len(), "material registry built");
        Ok(registry)
    }

    fn compile(&self, behavior: &Behavior) -> Plan {
        match behavior {
            Behavior::Inert => Plan::Inert,
            Behavior::Custom(update) => Plan::Custom(*update),
            Behavior::Moves(moves) => {
                let moves: Box<[CompiledMove]> = moves
                    .iter()
                    .map(|mv| CompiledMove {
                        dx: mv.dx,
                        dy: mv.dy,
                        into: self.set_of(&mv.into),
                    })
                    .collect();
                let biased = moves.iter().any(|mv| mv.dx.is_biased() || mv.dy.is_biased());
                Plan::Moves { moves, biased }
            }
        }
    }

    /// Number of registered materials.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a successfully registered list (`air` exists).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a name to its id.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownMaterial`] if the name was never registered.
    pub fn id_of(&self, name: &str) -> SimResult<MaterialId> {
        self.lookup(name).ok_or_else(|| SimError::UnknownMaterial {
            name: name.to_owned(),
        })
    }

    /// Resolves a name to its id, if registered.
    #[inline]
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<MaterialId> {
        self.by_name.get(name).copied()
    }

    /// Resolves an id to its definition.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownMaterialId`] if the id is past the end of the registry.
    /// This happens for uninitialised buffer bytes; callers treat it as air.
    pub fn material_of(&self, id: MaterialId) -> SimResult<&Material> {
        self.get(id).ok_or(SimError::UnknownMaterialId(id.raw()))
    }

    /// Resolves an id to its definition, if registered.
    #[inline]
    #[must_use]
    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.entries.get(id.index()).map(|entry| &entry.material)
    }

    /// The compiled update plan for `id`.
    #[inline]
    #[must_use]
    pub fn plan_of(&self, id: MaterialId) -> Option<&Plan> {
        self.entries.get(id.index()).map(|entry| &entry.plan)
    }

    /// Whether `id` names a registered material.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: MaterialId) -> bool {
        id.index() < self.entries.len()
    }

    /// Builds a set from names. Unregistered names are ignored, so they never match.
    #[must_use]
    pub fn set_of<S: AsRef<str>>(&self, names: &[S]) -> MaterialSet {
        names
            .iter()
            .filter_map(|name| self.lookup(name.as_ref()))
            .fold(MaterialSet::EMPTY, MaterialSet::with)
    }

    /// Iterates materials in id order.
    pub fn iter(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (MaterialId::new(index as u8), &entry.material))
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| entry.material.name()))
            .finish()
    }
}
