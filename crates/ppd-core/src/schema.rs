//! Frozen dimension-to-group schema
//!
//! A [`ProfileSchema`] is loaded once at process start and shared read-only
//! by every computation of a run. It fixes:
//!
//! - which skill groups exist, in report order
//! - which dimensions belong to each group, in declared order
//! - whether a group's order is semantically meaningful (`ordered`)
//!
//! Dimension identifiers are `"<group>::<name>"`, so two groups may reuse the
//! same dimension name without colliding.
//!
//! # Serialization
//!
//! ```json
//! {
//!   "groups": [
//!     { "id": "communication", "ordered": false, "dimensions": ["grammar", "clarity"] },
//!     { "id": "reasoning", "ordered": true, "dimensions": ["recall", "apply", "evaluate"] }
//!   ]
//! }
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Separator between group and dimension name in a dimension identifier.
pub const DIMENSION_DELIMITER: &str = "::";

/// Builds the identifier of dimension `name` in group `group`.
#[must_use]
pub fn dimension_id(group: &str, name: &str) -> String {
    format!("{group}{DIMENSION_DELIMITER}{name}")
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SchemaError {
    #[display("schema declares no groups")]
    EmptySchema,
    #[display("group '{group}' declares no dimensions")]
    EmptyGroup { group: String },
    #[display("group '{group}' is declared more than once")]
    DuplicateGroup { group: String },
    #[display("dimension '{dimension}' is declared more than once")]
    DuplicateDimension { dimension: String },
    #[display("identifier '{id}' must be non-empty and must not contain '::'")]
    InvalidIdentifier { id: String },
}

/// One assessed dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dimension {
    /// Identifier (`"<group>::<name>"`)
    pub id: String,
    /// Parent group identifier
    pub group: String,
    /// Display name
    pub name: String,
}

/// Declaration of one group, as read from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub id: String,
    /// Whether `dimensions` follow a natural order (enables local volatility)
    #[serde(default)]
    pub ordered: bool,
    /// Dimension names, in declared order
    pub dimensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SchemaSpec {
    groups: Vec<GroupSpec>,
}

/// A group of the frozen schema with its resolved dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaGroup {
    pub id: String,
    pub ordered: bool,
    pub dimensions: Vec<Dimension>,
}

/// Static dimension-to-group lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SchemaSpec", into = "SchemaSpec")]
pub struct ProfileSchema {
    groups: Vec<SchemaGroup>,
    /// dimension id -> (group index, position within group)
    index: HashMap<String, (usize, usize)>,
}

impl TryFrom<SchemaSpec> for ProfileSchema {
    type Error = SchemaError;

    fn try_from(spec: SchemaSpec) -> Result<Self, Self::Error> {
        Self::new(spec.groups)
    }
}

impl From<ProfileSchema> for SchemaSpec {
    fn from(schema: ProfileSchema) -> Self {
        let groups = schema
            .groups
            .into_iter()
            .map(|group| GroupSpec {
                id: group.id,
                ordered: group.ordered,
                dimensions: group.dimensions.into_iter().map(|d| d.name).collect(),
            })
            .collect();
        Self { groups }
    }
}

fn check_identifier(id: &str) -> Result<(), SchemaError> {
    if id.trim().is_empty() || id.contains(DIMENSION_DELIMITER) {
        return Err(SchemaError::InvalidIdentifier { id: id.to_owned() });
    }
    Ok(())
}

impl ProfileSchema {
    /// Builds the schema from group declarations.
    ///
    /// # Examples
    ///
    /// ```
    /// use ppd_core::schema::{GroupSpec, ProfileSchema};
    ///
    /// let schema = ProfileSchema::new(vec![GroupSpec {
    ///     id: "communication".to_owned(),
    ///     ordered: false,
    ///     dimensions: vec!["grammar".to_owned(), "clarity".to_owned()],
    /// }])
    /// .unwrap();
    ///
    /// assert_eq!(schema.dimension_count(), 2);
    /// assert_eq!(schema.group_of("communication::clarity"), Some("communication"));
    /// ```
    pub fn new(specs: Vec<GroupSpec>) -> Result<Self, SchemaError> {
        if specs.is_empty() {
            return Err(SchemaError::EmptySchema);
        }

        let mut seen_groups = HashSet::new();
        let mut index = HashMap::new();
        let mut groups = Vec::with_capacity(specs.len());

        for (group_index, spec) in specs.into_iter().enumerate() {
            check_identifier(&spec.id)?;
            if !seen_groups.insert(spec.id.clone()) {
                return Err(SchemaError::DuplicateGroup { group: spec.id });
            }
            if spec.dimensions.is_empty() {
                return Err(SchemaError::EmptyGroup { group: spec.id });
            }

            let mut dimensions = Vec::with_capacity(spec.dimensions.len());
            for (position, name) in spec.dimensions.into_iter().enumerate() {
                check_identifier(&name)?;
                let id = dimension_id(&spec.id, &name);
                if index.insert(id.clone(), (group_index, position)).is_some() {
                    return Err(SchemaError::DuplicateDimension { dimension: id });
                }
                dimensions.push(Dimension {
                    id,
                    group: spec.id.clone(),
                    name,
                });
            }

            groups.push(SchemaGroup {
                id: spec.id,
                ordered: spec.ordered,
                dimensions,
            });
        }

        Ok(Self { groups, index })
    }

    /// Groups in declared order.
    #[must_use]
    pub fn groups(&self) -> &[SchemaGroup] {
        &self.groups
    }

    /// All dimensions, group by group, in declared order.
    pub fn dimensions(&self) -> impl Iterator<Item = &Dimension> + '_ {
        self.groups.iter().flat_map(|g| &g.dimensions)
    }

    #[must_use]
    pub fn dimension_count(&self) -> usize {
        self.index.len()
    }

    /// Position of a dimension: (group index, index within group).
    #[must_use]
    pub fn locate(&self, dimension: &str) -> Option<(usize, usize)> {
        self.index.get(dimension).copied()
    }

    #[must_use]
    pub fn group_of(&self, dimension: &str) -> Option<&str> {
        let (group, _) = self.locate(dimension)?;
        Some(&self.groups[group].id)
    }
}
