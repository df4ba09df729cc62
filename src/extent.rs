//! Axis-aligned bounding rectangles in the source coordinate system.
//!
//! No coordinate transformation happens anywhere in this crate; an `Extent`
//! carries whatever units the upstream reader reported.

use serde::{Deserialize, Serialize};

/// Planar bounding box. Invariant: `minx <= maxx` and `miny <= maxy`.
/// Degenerate single-point extents (min == max) are valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl Extent {
    /// Returns `None` when min exceeds max on either axis.
    pub fn checked(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Option<Self> {
        if minx > maxx || miny > maxy {
            return None;
        }
        Some(Extent {
            minx,
            miny,
            maxx,
            maxy,
        })
    }

    /// 2-D area of the box. Zero for degenerate extents.
    pub fn planar_area(&self) -> f64 {
        (self.maxx - self.minx) * (self.maxy - self.miny)
    }

    /// Componentwise min/max union. Associative and commutative, so folds
    /// over it are order-insensitive.
    pub fn union(&self, other: &Extent) -> Extent {
        Extent {
            minx: self.minx.min(other.minx),
            miny: self.miny.min(other.miny),
            maxx: self.maxx.max(other.maxx),
            maxy: self.maxy.max(other.maxy),
        }
    }
}

/// Folds a sequence of extents into their union. `None` when the iterator is
/// empty, so "no spatial data" stays distinguishable from a degenerate box.
pub fn union_all<'a, I>(extents: I) -> Option<Extent>
where
    I: IntoIterator<Item = &'a Extent>,
{
    extents
        .into_iter()
        .fold(None, |acc: Option<Extent>, extent| match acc {
            Some(current) => Some(current.union(extent)),
            None => Some(*extent),
        })
}
