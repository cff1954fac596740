use cavalier_contours::core::math::Vector2;
use cavalier_contours::polyline::{
    BooleanOp, BooleanResultInfo, PlineOrientation, PlineSource, PlineSourceMut, Polyline,
};
use perimeter_core::Point;

/// A planar region as counter-clockwise shells (`pos`) and clockwise holes (`neg`).
///
/// Islands inside holes are represented by a further shell, so membership counts nesting
/// depth rather than testing shells and holes independently.
#[derive(Debug, Clone, Default)]
pub struct Region {
    pub pos: Vec<Polyline<f64>>,
    pub neg: Vec<Polyline<f64>>,
}

impl Region {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_pos(pos: Vec<Polyline<f64>>) -> Self {
        Self {
            pos: normalize_winding(pos, PlineOrientation::CounterClockwise),
            neg: vec![],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }

    pub fn union_all(mut plines: Vec<Polyline<f64>>) -> Self {
        plines.retain(|p| p.is_closed() && p.vertex_count() >= 2);
        plines = plines.into_iter().map(simplify).collect();
        let (pos, neg) = union_pline_set_with_holes(plines);
        Self {
            pos: normalize_winding(pos, PlineOrientation::CounterClockwise),
            neg: normalize_winding(neg, PlineOrientation::Clockwise),
        }
    }

    /// Union of the shells of both regions. Holes come only from shells that enclose an
    /// uncovered area between them.
    pub fn union(&self, other: &Region) -> Region {
        let mut shells = self.pos.clone();
        shells.extend(other.pos.iter().cloned());
        Region::union_all(shells)
    }

    /// The region with every hole filled.
    pub fn filled(&self) -> Region {
        Self {
            pos: self.pos.clone(),
            neg: vec![],
        }
    }

    pub fn area(&self) -> f64 {
        let shells: f64 = self.pos.iter().map(|p| p.area().abs()).sum();
        let holes: f64 = self.neg.iter().map(|p| p.area().abs()).sum();
        shells - holes
    }

    pub fn contains(&self, p: Point) -> bool {
        let at = Vector2::new(p[0], p[1]);
        let shells = self.pos.iter().filter(|pl| pl.winding_number(at) != 0).count();
        let holes = self.neg.iter().filter(|pl| pl.winding_number(at) != 0).count();
        shells > holes
    }

    /// Distance from `p` to the nearest shell or hole outline, `None` for an empty region.
    pub fn boundary_distance(&self, p: Point) -> Option<f64> {
        let at = Vector2::new(p[0], p[1]);
        self.pos
            .iter()
            .chain(self.neg.iter())
            .filter_map(|pl| pl.closest_point(at, 1e-9).map(|r| r.distance))
            .reduce(f64::min)
    }
}

fn union_pline_set_with_holes(
    mut plines: Vec<Polyline<f64>>,
) -> (Vec<Polyline<f64>>, Vec<Polyline<f64>>) {
    // O(n^2) pairwise merge until stable; claimed loops per extraction are few.
    plines.retain(|p| p.is_closed() && p.vertex_count() >= 2);
    plines = normalize_winding(
        plines.into_iter().map(simplify).collect(),
        PlineOrientation::CounterClockwise,
    );

    let mut holes: Vec<Polyline<f64>> = Vec::new();

    let mut i = 0usize;
    while i < plines.len() {
        let mut merged = false;
        let mut j = i + 1;
        while j < plines.len() {
            let res = plines[i].boolean(&plines[j], BooleanOp::Or);
            match res.result_info {
                BooleanResultInfo::Disjoint | BooleanResultInfo::InvalidInput => {
                    j += 1;
                }
                _ => {
                    let mut next: Vec<Polyline<f64>> = res
                        .pos_plines
                        .into_iter()
                        .map(|p| simplify(p.pline))
                        .collect();
                    holes.extend(res.neg_plines.into_iter().map(|p| simplify(p.pline)));

                    plines.swap_remove(j);
                    plines.swap_remove(i);
                    plines.append(&mut next);
                    merged = true;
                    break;
                }
            }
        }
        if merged {
            i = 0;
        } else {
            i += 1;
        }
    }

    (plines, holes)
}

fn normalize_winding(
    plines: Vec<Polyline<f64>>,
    desired: PlineOrientation,
) -> Vec<Polyline<f64>> {
    plines
        .into_iter()
        .map(|mut pl| {
            let orientation = pl.orientation();
            if orientation != PlineOrientation::Open && orientation != desired {
                pl.invert_direction_mut();
            }
            pl
        })
        .collect()
}

fn simplify(p: Polyline<f64>) -> Polyline<f64> {
    p.remove_redundant(1e-9).unwrap_or(p)
}
