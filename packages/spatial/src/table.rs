//! Geometry-bearing tables.

use crate::crs::Crs;

/// One row of a [`GeoTable`]: the row's attributes and its geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoRow<T, G> {
    /// Non-geometric attributes.
    pub attributes: T,
    /// Geometry, in the owning table's reference frame.
    pub geometry: G,
}

impl<T, G> GeoRow<T, G> {
    /// Creates a row.
    pub const fn new(attributes: T, geometry: G) -> Self {
        Self {
            attributes,
            geometry,
        }
    }
}

/// A table of rows that share one declared reference frame.
///
/// Every row carries a geometry; rows without one never enter a table.
/// A table with no declared frame holds coordinates whose meaning is
/// unknown and cannot be reprojected.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoTable<T, G> {
    crs: Option<Crs>,
    rows: Vec<GeoRow<T, G>>,
}

impl<T, G> GeoTable<T, G> {
    /// Creates a table from rows and an optional declared frame.
    #[must_use]
    pub const fn new(crs: Option<Crs>, rows: Vec<GeoRow<T, G>>) -> Self {
        Self { crs, rows }
    }

    /// The declared reference frame, if any.
    #[must_use]
    pub const fn crs(&self) -> Option<Crs> {
        self.crs
    }

    /// Declares `crs` only when the table has no frame yet.
    #[must_use]
    pub fn with_default_crs(mut self, crs: Crs) -> Self {
        self.crs.get_or_insert(crs);
        self
    }

    /// Rows in insertion order.
    #[must_use]
    pub fn rows(&self) -> &[GeoRow<T, G>] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates over rows.
    pub fn iter(&self) -> std::slice::Iter<'_, GeoRow<T, G>> {
        self.rows.iter()
    }

    /// Consumes the table, returning its rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<GeoRow<T, G>> {
        self.rows
    }

    /// Maps each row's attributes, keeping geometries and frame.
    #[must_use]
    pub fn map_attributes<U>(self, mut f: impl FnMut(T) -> U) -> GeoTable<U, G> {
        GeoTable {
            crs: self.crs,
            rows: self
                .rows
                .into_iter()
                .map(|row| GeoRow::new(f(row.attributes), row.geometry))
                .collect(),
        }
    }

    /// Maps or drops whole rows, keeping the frame.
    #[must_use]
    pub fn filter_map_rows<U, H>(
        self,
        f: impl FnMut(GeoRow<T, G>) -> Option<GeoRow<U, H>>,
    ) -> GeoTable<U, H> {
        GeoTable {
            crs: self.crs,
            rows: self.rows.into_iter().filter_map(f).collect(),
        }
    }

    /// Narrows each row to a key derived from its attributes plus a cloned
    /// geometry.
    ///
    /// Used to narrow a table to the columns a join actually needs.
    #[must_use]
    pub fn select<K>(&self, mut key: impl FnMut(&T) -> K) -> GeoTable<K, G>
    where
        G: Clone,
    {
        GeoTable {
            crs: self.crs,
            rows: self
                .rows
                .iter()
                .map(|row| GeoRow::new(key(&row.attributes), row.geometry.clone()))
                .collect(),
        }
    }
}

impl<'a, T, G> IntoIterator for &'a GeoTable<T, G> {
    type Item = &'a GeoRow<T, G>;
    type IntoIter = std::slice::Iter<'a, GeoRow<T, G>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
