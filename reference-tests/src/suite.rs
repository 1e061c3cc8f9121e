//! The reference scenarios shipped under `configs/`.

use crate::{
    dam_break_expectations, ConservationCheck, ExpectedResult, PositionBoundsCheck,
    ReferenceTest, SymmetryCheck,
};

/// Dry-bed dam break against Ritter's solution
pub fn ritter_dam_break_test(config_path: String) -> Result<ReferenceTest, String> {
    Ok(ReferenceTest {
        name: "Ritter Dry Dam Break".to_string(),
        expected: dam_break_expectations(&config_path, 0.5, 1.3, 0.05)?,
        config_path,
    })
}

/// Wet-bed dam break against Stoker's solution
pub fn stoker_dam_break_test(config_path: String) -> Result<ReferenceTest, String> {
    Ok(ReferenceTest {
        name: "Stoker Wet Dam Break".to_string(),
        expected: dam_break_expectations(&config_path, 0.0, f64::INFINITY, 0.05)?,
        config_path,
    })
}

/// Centred drop in a periodic channel spreads without net drift
pub fn water_drop_symmetry_test(config_path: String) -> ReferenceTest {
    ReferenceTest {
        name: "Symmetric Water Drop".to_string(),
        config_path,
        expected: ExpectedResult {
            position_bounds: Some(PositionBoundsCheck { min: -5.0, max: 5.0 }),
            finite_state: true,
            conservation: Some(ConservationCheck {
                max_volume_error: 1.0e-3,
            }),
            symmetry: Some(SymmetryCheck {
                max_relative_momentum: 1.0e-6,
            }),
            ..ExpectedResult::default()
        },
    }
}

/// Every reference test, with config paths under `root`
pub fn all_tests(root: &std::path::Path) -> Result<Vec<ReferenceTest>, String> {
    let path = |name: &str| root.join("configs").join(name).to_string_lossy().into_owned();
    Ok(vec![
        ritter_dam_break_test(path("dam_break_dry.json"))?,
        stoker_dam_break_test(path("dam_break_wet.json"))?,
        water_drop_symmetry_test(path("water_drop_cyclic.json")),
    ])
}
