mod util;

use mesh_hadapt::prelude::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use util::*;

fn cell_type() -> impl Strategy<Value = StructuredCellType> {
    prop_oneof![
        Just(StructuredCellType::Triangle),
        Just(StructuredCellType::Quadrilateral),
        Just(StructuredCellType::Mixed),
    ]
}

/// Indicator with roughly a quarter of the elements above the refinement
/// tolerance and half below the coarsening tolerance.
fn random_indicator(rng: &mut StdRng, nel: usize) -> Vec<f64> {
    (0..nel)
        .map(|_| match rng.gen_range(0..4) {
            0 => 1.0,
            1 => 0.3,
            _ => 0.0,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_cycles_keep_the_mesh_valid(
        seed in any::<u64>(),
        n in 1usize..7,
        cells in cell_type(),
        cycles in 1usize..8,
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut mesh = unit_square(n, cells).unwrap();
        let area = total_area(&mesh);
        for _ in 0..cycles {
            let indicator = random_indicator(&mut rng, mesh.nel());
            cycle(&mut mesh, &indicator);
            assert_valid(&mesh);
            assert_conforming(&mesh);
            assert_patches_recognised(&mesh);
            prop_assert!((total_area(&mesh) - area).abs() < 1e-9);
        }
    }

    #[test]
    fn deep_random_cycles_stay_conforming(
        seed in any::<u64>(),
        cells in cell_type(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut mesh = unit_square(4, cells).unwrap();
        let options = AdaptOptions {
            max_subdivision: 4,
            ..AdaptOptions::default()
        };
        for _ in 0..6 {
            let indicator = random_indicator(&mut rng, mesh.nel());
            adapt_mesh(&mut mesh, &indicator, &options, None).unwrap();
            assert_valid(&mesh);
            assert_conforming(&mesh);
            assert_patches_recognised(&mesh);
        }
    }

    #[test]
    fn zero_indicator_eventually_restores_the_root_mesh(
        seed in any::<u64>(),
        cells in cell_type(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut mesh = unit_square(2, cells).unwrap();
        let (nvt, nel) = (mesh.nvt(), mesh.nel());
        let indicator = random_indicator(&mut rng, nel);
        cycle(&mut mesh, &indicator);
        // extra cycles must be no-ops once the root mesh is back
        for _ in 0..3 {
            let zero = vec![0.0; mesh.nel()];
            cycle(&mut mesh, &zero);
        }
        prop_assert_eq!((mesh.nvt(), mesh.nel()), (nvt, nel));
        assert_valid(&mesh);
    }
}
