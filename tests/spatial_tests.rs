use softpoly::{Polygon, SpatialHashGrid, Vec2};

fn scatter() -> Vec<Polygon<f64>> {
    let mut polys = Vec::new();
    for i in 0..7 {
        for j in 0..5 {
            let x = -3.0 + i as f64 * 0.9 + (j as f64 * 0.37).sin() * 0.2;
            let y = -2.0 + j as f64 * 1.1;
            polys.push(Polygon::regular(Vec2::new(x, y), 5, 0.3, 0.3, 0.0).unwrap());
        }
    }
    polys
}

#[test]
fn nearby_covers_chebyshev_neighbourhood() {
    let polys = scatter();
    let mut grid = SpatialHashGrid::new(1.0);
    for (i, p) in polys.iter().enumerate() {
        grid.insert(i, p);
    }
    for (i, p) in polys.iter().enumerate() {
        let nearby = grid.nearby(i, p);
        assert!(!nearby.contains(&i), "polygon {} listed as its own neighbour", i);
        let (cx, cy) = grid.cell_of(p.center());
        for (j, q) in polys.iter().enumerate() {
            if i == j {
                continue;
            }
            let (qx, qy) = grid.cell_of(q.center());
            let adjacent = (qx - cx).abs() <= 1 && (qy - cy).abs() <= 1;
            assert_eq!(nearby.contains(&j), adjacent, "pair ({}, {})", i, j);
        }
    }
}

#[test]
fn candidate_pairs_agree_with_nearby() {
    let polys = scatter();
    let mut grid = SpatialHashGrid::new(1.0);
    for (i, p) in polys.iter().enumerate() {
        grid.insert(i, p);
    }
    let pairs = grid.candidate_pairs();
    for (i, p) in polys.iter().enumerate() {
        for j in grid.nearby(i, p) {
            let key = (i.min(j), i.max(j));
            assert!(pairs.binary_search(&key).is_ok(), "missing pair {:?}", key);
        }
    }
    let total: usize = polys.iter().enumerate().map(|(i, p)| grid.nearby(i, p).len()).sum();
    assert_eq!(pairs.len() * 2, total);
}
