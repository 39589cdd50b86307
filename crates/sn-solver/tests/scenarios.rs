//! End-to-end fixed-source scenarios against reference fluxes.

use sn_angle::Quadrature;
use sn_geometry::{Axis, Dimension, Mesh};
use sn_material::{Material, library};
use sn_solver::{
    FixedSourceManager, InnerSolverKind, OuterSolverKind, SolverSettings, TransportProblem,
};
use sn_transport::{
    BoundaryCondition, ConstantSource, CurrentTally, EquationKind, ExternalSource,
};
use std::sync::Arc;

const SCENARIO_A_LEFT: f64 = 3.6060798202396613;

const SCENARIO_B_FORWARD: [f64; 7] = [
    19.83654685392368,
    344.1079047626809,
    53.02787426165165,
    11.25133608569081,
    26.62710276585539,
    10.10604145062320,
    4.015682491688769,
];

const SCENARIO_B_ADJOINT: [f64; 7] = [
    185.97006830431883,
    197.62123850286665,
    34.985882831833216,
    11.296012851531682,
    26.939619918013236,
    8.478379540507643,
    3.6812867230431547,
];

/// Multiplying reflective UO2 slab; the leftmost cell of each group.
const SCENARIO_B_FORWARD_MULTIPLY: [f64; 7] = [
    3.646729598901197e+02,
    5.352648103971697e+03,
    3.309487533450470e+02,
    1.856704021668497e+01,
    2.763765763929116e+01,
    1.018645586459539e+01,
    4.020322297305944e+00,
];

const SCENARIO_B_ADJOINT_MULTIPLY: [f64; 7] = [
    8.164042429244962e+02,
    6.027576162725934e+02,
    4.583647621311337e+02,
    3.956844300911188e+02,
    1.145654520054639e+03,
    1.333127219999030e+03,
    1.356688501751730e+03,
];

fn assert_rel(actual: f64, expected: f64, tol: f64) {
    let err = (actual - expected).abs() / expected.abs();
    assert!(err < tol, "expected {expected}, got {actual} (rel err {err:.2e})");
}

fn slab_problem(
    material: Material,
    cells: usize,
    angles: usize,
    condition: BoundaryCondition,
    strength: f64,
) -> TransportProblem {
    let groups = material.number_groups();
    let mesh = Arc::new(Mesh::uniform(Dimension::One, cells, 1.0, 0));
    let quad = Arc::new(Quadrature::gauss_legendre(angles).unwrap());
    let q: Arc<dyn ExternalSource> =
        Arc::new(ConstantSource::new(Dimension::One, vec![strength; groups]).unwrap());
    let mut problem = TransportProblem::new(mesh, Arc::new(material), quad).with_external(q);
    problem.boundary = vec![condition; 2];
    problem
}

fn scenario_a() -> TransportProblem {
    slab_problem(
        library::one_group(1.0, 0.9, 0.0).unwrap(),
        5,
        1,
        BoundaryCondition::Vacuum,
        1.0,
    )
}

fn scenario_b(adjoint: bool) -> TransportProblem {
    let problem = slab_problem(
        library::c5g7_uo2().unwrap(),
        5,
        2,
        BoundaryCondition::Reflective,
        1.0,
    );
    problem.with_settings(SolverSettings {
        inner_solver: InnerSolverKind::Gmres,
        inner_tolerance: 1e-13,
        inner_max_iterations: 500,
        outer_solver: OuterSolverKind::Krylov,
        outer_tolerance: 1e-13,
        outer_max_iterations: 1000,
        gmres_restart: 30,
        adjoint,
        ..Default::default()
    })
}

#[test]
fn scenario_a_source_iteration() {
    let problem = scenario_a().with_settings(SolverSettings {
        inner_tolerance: 1e-14,
        inner_max_iterations: 5000,
        ..Default::default()
    });
    let solution = FixedSourceManager::new(&problem).unwrap().solve().unwrap();
    assert!(solution.converged());
    assert_rel(solution.phi[0][0], SCENARIO_A_LEFT, 1e-10);
    // Symmetric about the slab midplane.
    assert_rel(solution.phi[0][4], solution.phi[0][0], 1e-10);
}

#[test]
fn scenario_a_krylov_with_forced_window() {
    let problem = scenario_a().with_settings(SolverSettings {
        outer_solver: OuterSolverKind::Krylov,
        outer_tolerance: 1e-13,
        outer_max_iterations: 200,
        upscatter_cutoff: Some(0),
        ..Default::default()
    });
    let mut manager = FixedSourceManager::new(&problem).unwrap();
    assert_eq!(manager.session().cutoff(), 0);
    let solution = manager.solve().unwrap();
    assert!(solution.converged());
    assert_rel(solution.phi[0][0], SCENARIO_A_LEFT, 1e-10);
}

#[test]
fn scenario_b_forward() {
    let mut manager = FixedSourceManager::new(&scenario_b(false)).unwrap();
    assert_eq!(manager.session().cutoff(), 3);
    let solution = manager.solve().unwrap();
    assert!(solution.converged());
    for (g, expected) in SCENARIO_B_FORWARD.iter().enumerate() {
        assert_rel(solution.phi[g][0], *expected, 1e-8);
        // Reflective slab with a flat source stays flat.
        assert_rel(solution.phi[g][4], *expected, 1e-8);
    }
}

#[test]
fn scenario_b_adjoint_differs_from_forward() {
    let solution = FixedSourceManager::new(&scenario_b(true))
        .unwrap()
        .solve()
        .unwrap();
    assert!(solution.converged());
    assert!(solution.adjoint);
    for (g, expected) in SCENARIO_B_ADJOINT.iter().enumerate() {
        assert_rel(solution.phi[g][0], *expected, 1e-8);
    }
    let forward_differs = SCENARIO_B_FORWARD
        .iter()
        .zip(&solution.phi)
        .any(|(f, a)| (f - a[0]).abs() > 1e-3 * f);
    assert!(forward_differs);
}

#[test]
fn scenario_b_gauss_seidel_agrees() {
    let problem = scenario_b(false).with_settings(SolverSettings {
        inner_solver: InnerSolverKind::Gmres,
        inner_tolerance: 1e-12,
        inner_max_iterations: 500,
        outer_tolerance: 1e-10,
        outer_max_iterations: 5000,
        ..Default::default()
    });
    let solution = FixedSourceManager::new(&problem).unwrap().solve().unwrap();
    assert!(solution.converged());
    for (g, expected) in SCENARIO_B_FORWARD.iter().enumerate() {
        assert_rel(solution.phi[g][2], *expected, 1e-6);
    }
}

fn scenario_b_multiply(adjoint: bool, outer: OuterSolverKind) -> TransportProblem {
    let mut problem = scenario_b(adjoint);
    problem.settings.multiply = true;
    if outer == OuterSolverKind::GaussSeidel {
        problem.settings.outer_solver = outer;
        problem.settings.outer_tolerance = 1e-8;
        problem.settings.outer_max_iterations = 5000;
    }
    problem
}

#[test]
fn scenario_b_multiplying_krylov() {
    for (adjoint, reference) in [
        (false, SCENARIO_B_FORWARD_MULTIPLY),
        (true, SCENARIO_B_ADJOINT_MULTIPLY),
    ] {
        let mut manager =
            FixedSourceManager::new(&scenario_b_multiply(adjoint, OuterSolverKind::Krylov))
                .unwrap();
        assert_eq!(manager.session().cutoff(), 0);
        let solution = manager.solve().unwrap();
        assert!(solution.converged());
        for (g, expected) in reference.iter().enumerate() {
            assert_rel(solution.phi[g][0], *expected, 1e-8);
        }
    }
}

#[test]
fn scenario_b_multiplying_gauss_seidel() {
    for (adjoint, reference) in [
        (false, SCENARIO_B_FORWARD_MULTIPLY),
        (true, SCENARIO_B_ADJOINT_MULTIPLY),
    ] {
        let problem = scenario_b_multiply(adjoint, OuterSolverKind::GaussSeidel);
        let solution = FixedSourceManager::new(&problem).unwrap().solve().unwrap();
        assert!(solution.converged());
        for (g, expected) in reference.iter().enumerate() {
            assert_rel(solution.phi[g][0], *expected, 1e-6);
        }
    }
}

#[test]
fn multidimensional_reflective_boxes_reach_infinite_medium() {
    for (dim, equation) in [
        (Dimension::Two, EquationKind::DiamondDifference),
        (Dimension::Two, EquationKind::StepDifference),
        (Dimension::Three, EquationKind::DiamondDifference),
        (Dimension::Three, EquationKind::StepDifference),
    ] {
        let mesh = Arc::new(Mesh::uniform(dim, 3, 0.7, 0));
        let quad = Arc::new(Quadrature::product(2, 2, dim).unwrap());
        let material = Arc::new(library::one_group(1.0, 0.5, 0.0).unwrap());
        let q: Arc<dyn ExternalSource> = Arc::new(ConstantSource::new(dim, vec![1.0]).unwrap());
        let mut problem = TransportProblem::new(mesh, material, quad).with_external(q);
        problem.boundary = vec![BoundaryCondition::Reflective; dim.number_sides()];
        problem.settings = SolverSettings {
            equation,
            inner_tolerance: 1e-12,
            inner_max_iterations: 500,
            ..Default::default()
        };
        let solution = FixedSourceManager::new(&problem).unwrap().solve().unwrap();
        assert!(solution.converged());
        for v in &solution.phi[0] {
            assert_rel(*v, 2.0, 1e-9);
        }
    }
}

#[test]
fn fixed_incident_flux_drives_a_source_free_slab() {
    let mut problem = slab_problem(
        library::one_group(1.0, 0.0, 0.0).unwrap(),
        4,
        2,
        BoundaryCondition::Vacuum,
        0.0,
    );
    problem.external = None;
    problem.boundary[0] = BoundaryCondition::FixedIncident(vec![1.0]);
    problem.settings.equation = EquationKind::StepDifference;
    let solution = FixedSourceManager::new(&problem).unwrap().solve().unwrap();
    let phi = &solution.phi[0];
    assert!(phi[0] > 0.0);
    for w in phi.windows(2) {
        assert!(w[0] > w[1], "flux should decay into the slab: {phi:?}");
    }
}

#[test]
fn vacuum_boxes_are_mirror_and_transpose_symmetric() {
    for (dim, equation) in [
        (Dimension::Two, EquationKind::DiamondDifference),
        (Dimension::Two, EquationKind::StepDifference),
        (Dimension::Three, EquationKind::DiamondDifference),
        (Dimension::Three, EquationKind::StepDifference),
    ] {
        let n = 4;
        let mesh = Arc::new(Mesh::uniform(dim, n, 0.5, 0));
        let quad = Arc::new(Quadrature::product(3, 2, dim).unwrap());
        let material = Arc::new(library::one_group(1.0, 0.5, 0.0).unwrap());
        let q: Arc<dyn ExternalSource> = Arc::new(ConstantSource::new(dim, vec![1.0]).unwrap());
        let mut problem = TransportProblem::new(mesh.clone(), material, quad).with_external(q);
        problem.boundary = vec![BoundaryCondition::Vacuum; dim.number_sides()];
        problem.settings = SolverSettings {
            equation,
            inner_solver: InnerSolverKind::Gmres,
            inner_tolerance: 1e-13,
            inner_max_iterations: 500,
            ..Default::default()
        };
        let solution = FixedSourceManager::new(&problem).unwrap().solve().unwrap();
        assert!(solution.converged());
        let phi = &solution.phi[0];
        let nz = if dim == Dimension::Three { n } else { 1 };
        let at = |i: usize, j: usize, k: usize| phi[mesh.index(i, j, k)];
        for k in 0..nz {
            for j in 0..n {
                for i in 0..n {
                    let v = at(i, j, k);
                    assert!(v > 0.0);
                    assert_rel(at(n - 1 - i, j, k), v, 1e-10);
                    assert_rel(at(i, n - 1 - j, k), v, 1e-10);
                    assert_rel(at(j, i, k), v, 1e-10);
                    if dim == Dimension::Three {
                        assert_rel(at(i, j, nz - 1 - k), v, 1e-10);
                    }
                }
            }
        }
        // Leakage keeps the corner below the center.
        assert!(at(0, 0, 0) < at(n / 2, n / 2, nz / 2));
    }
}

#[test]
fn tallied_leakage_balances_scattering_slab() {
    let problem = slab_problem(
        library::one_group(1.0, 0.5, 0.0).unwrap(),
        10,
        4,
        BoundaryCondition::Vacuum,
        1.0,
    )
    .with_settings(SolverSettings {
        inner_tolerance: 1e-13,
        inner_max_iterations: 2000,
        ..Default::default()
    });
    let mut manager = FixedSourceManager::new(&problem).unwrap();
    let tally = CurrentTally::new(
        problem.mesh.clone(),
        problem.quadrature.clone(),
        1,
        5,
    )
    .unwrap();
    manager.session_mut().sweeper_mut().set_tally(tally);
    let solution = manager.solve().unwrap();
    assert!(solution.converged());

    let mesh = manager.session().mesh();
    let absorption: f64 = (0..mesh.number_cells())
        .map(|c| 0.5 * solution.phi[0][c] * mesh.volume(c))
        .sum();
    let source = mesh.total_width(Axis::X);
    let tally = manager.session().sweeper().tally().unwrap();
    assert_rel(tally.net_leakage(0) + absorption, source, 1e-9);
    // Symmetric slab: equal outflow on both faces, and the midplane
    // currents cancel.
    let west = tally.partial_current(Axis::X, [0, 0, 0], 0, false);
    let east = tally.partial_current(Axis::X, [2, 0, 0], 0, true);
    assert_rel(west, east, 1e-9);
    let right = tally.partial_current(Axis::X, [1, 0, 0], 0, true);
    let left = tally.partial_current(Axis::X, [1, 0, 0], 0, false);
    assert_rel(right, left, 1e-9);
}
