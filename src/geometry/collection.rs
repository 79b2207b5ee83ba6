use std::ops::{Add, AddAssign};
use std::sync::Arc;

use crate::error::Result;
use crate::math::{Point3, Vector3};

use super::{Axis, Path, Surface};

/// An ordered group of paths meshed together.
///
/// A name set on the collection replaces the names of all members when the
/// collection is meshed.
#[derive(Debug, Clone, Default)]
pub struct PathCollection {
    paths: Vec<Path>,
    name: Option<String>,
}

/// An ordered group of surfaces meshed together.
///
/// A name set on the collection replaces the names of all members when the
/// collection is meshed.
#[derive(Debug, Clone, Default)]
pub struct SurfaceCollection {
    surfaces: Vec<Surface>,
    name: Option<String>,
}

macro_rules! collection_common {
    ($collection:ident, $item:ident, $field:ident) => {
        impl $collection {
            /// Creates an empty collection.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Appends a member.
            pub fn push(&mut self, item: $item) {
                self.$field.push(item);
            }

            /// Number of members.
            #[must_use]
            pub fn len(&self) -> usize {
                self.$field.len()
            }

            /// Returns `true` if the collection has no members.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.$field.is_empty()
            }

            /// Iterates over the members in insertion order.
            pub fn iter(&self) -> std::slice::Iter<'_, $item> {
                self.$field.iter()
            }

            /// Collection-wide name override, if any.
            #[must_use]
            pub fn name(&self) -> Option<&str> {
                self.name.as_deref()
            }

            /// Returns a copy of the collection with a name override for every member.
            #[must_use]
            pub fn with_name(&self, name: impl Into<String>) -> Self {
                Self {
                    name: Some(name.into()),
                    ..self.clone()
                }
            }

            /// Members as they are meshed: with the collection name applied.
            pub(crate) fn named_members(&self) -> Vec<$item> {
                match &self.name {
                    Some(name) => self.$field.iter().map(|m| m.with_name(name.clone())).collect(),
                    None => self.$field.clone(),
                }
            }

            /// Maps every point of every member through `f`.
            #[must_use]
            pub fn map_points<F>(&self, f: F) -> Self
            where
                F: Fn(&Point3) -> Point3 + Send + Sync + 'static,
            {
                let f = Arc::new(f);
                Self {
                    $field: self
                        .$field
                        .iter()
                        .map(|m| {
                            let f = Arc::clone(&f);
                            m.map_points(move |p| (*f)(p))
                        })
                        .collect(),
                    name: self.name.clone(),
                }
            }

            /// Translates every member.
            #[must_use]
            pub fn move_by(&self, dx: f64, dy: f64, dz: f64) -> Self {
                Self {
                    $field: self.$field.iter().map(|m| m.move_by(dx, dy, dz)).collect(),
                    name: self.name.clone(),
                }
            }

            /// Rotates every member around the axis through `origin`.
            ///
            /// # Errors
            ///
            /// Returns an error if `axis` is zero-length.
            pub fn rotate(&self, axis: &Vector3, angle: f64, origin: &Point3) -> Result<Self> {
                Ok(Self {
                    $field: self
                        .$field
                        .iter()
                        .map(|m| m.rotate(axis, angle, origin))
                        .collect::<Result<_>>()?,
                    name: self.name.clone(),
                })
            }

            /// Mirrors every member in the plane through `origin`.
            ///
            /// # Errors
            ///
            /// Returns an error if `normal` is zero-length.
            pub fn mirror(&self, normal: &Vector3, origin: &Point3) -> Result<Self> {
                Ok(Self {
                    $field: self
                        .$field
                        .iter()
                        .map(|m| m.mirror(normal, origin))
                        .collect::<Result<_>>()?,
                    name: self.name.clone(),
                })
            }
        }

        impl From<Vec<$item>> for $collection {
            fn from($field: Vec<$item>) -> Self {
                Self { $field, name: None }
            }
        }

        impl FromIterator<$item> for $collection {
            fn from_iter<I: IntoIterator<Item = $item>>(iter: I) -> Self {
                Self::from(iter.into_iter().collect::<Vec<_>>())
            }
        }

        impl Extend<$item> for $collection {
            fn extend<I: IntoIterator<Item = $item>>(&mut self, iter: I) {
                self.$field.extend(iter);
            }
        }

        impl<'a> IntoIterator for &'a $collection {
            type Item = &'a $item;
            type IntoIter = std::slice::Iter<'a, $item>;

            fn into_iter(self) -> Self::IntoIter {
                self.$field.iter()
            }
        }

        impl Add for $item {
            type Output = $collection;

            fn add(self, rhs: $item) -> $collection {
                $collection::from(vec![self, rhs])
            }
        }

        impl Add<$collection> for $item {
            type Output = $collection;

            fn add(self, rhs: $collection) -> $collection {
                let mut members = vec![self];
                members.extend(rhs.$field);
                $collection::from(members)
            }
        }

        impl Add<$item> for $collection {
            type Output = $collection;

            fn add(mut self, rhs: $item) -> $collection {
                self.$field.push(rhs);
                self
            }
        }

        impl Add for $collection {
            type Output = $collection;

            fn add(mut self, rhs: $collection) -> $collection {
                self.$field.extend(rhs.$field);
                self
            }
        }

        impl AddAssign<$item> for $collection {
            fn add_assign(&mut self, rhs: $item) {
                self.$field.push(rhs);
            }
        }

        impl AddAssign for $collection {
            fn add_assign(&mut self, rhs: $collection) {
                self.$field.extend(rhs.$field);
            }
        }
    };
}

collection_common!(PathCollection, Path, paths);
collection_common!(SurfaceCollection, Surface, surfaces);

impl PathCollection {
    fn map_to_surfaces<F>(&self, f: F) -> Result<SurfaceCollection>
    where
        F: Fn(&Path) -> Result<Surface>,
    {
        Ok(SurfaceCollection {
            surfaces: self.paths.iter().map(f).collect::<Result<_>>()?,
            name: self.name.clone(),
        })
    }

    /// Revolves every path around `axis`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a member.
    pub fn revolve(&self, axis: Axis, angle: f64) -> Result<SurfaceCollection> {
        self.map_to_surfaces(|p| p.revolve(axis, angle))
    }

    /// Revolves every path around the x-axis.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a member.
    pub fn revolve_x(&self, angle: f64) -> Result<SurfaceCollection> {
        self.revolve(Axis::X, angle)
    }

    /// Revolves every path around the y-axis.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a member.
    pub fn revolve_y(&self, angle: f64) -> Result<SurfaceCollection> {
        self.revolve(Axis::Y, angle)
    }

    /// Revolves every path around the z-axis.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a member.
    pub fn revolve_z(&self, angle: f64) -> Result<SurfaceCollection> {
        self.revolve(Axis::Z, angle)
    }

    /// Extrudes every path along `vector`.
    ///
    /// # Errors
    ///
    /// Returns an error if `vector` is zero-length.
    pub fn extrude(&self, vector: &Vector3) -> Result<SurfaceCollection> {
        self.map_to_surfaces(|p| p.extrude(vector))
    }

    /// Sweeps every path along `along`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a member.
    pub fn extrude_by_path(&self, along: &Path) -> Result<SurfaceCollection> {
        self.map_to_surfaces(|p| p.extrude_by_path(along))
    }
}
