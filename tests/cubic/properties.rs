use approx::assert_relative_eq;
use realgas::parameter::IdentifierOption;
use realgas::{BinaryTable, Mixture, MixtureBuilder, SolverOptions, Species, RGAS};
use std::error::Error;
use std::sync::Arc;

fn natural_gas() -> Result<Mixture, Box<dyn Error>> {
    let species = Species::from_json(
        &["methane", "ethane", "propane", "nitrogen", "carbon dioxide"],
        "tests/cubic/test_parameters.json",
        IdentifierOption::Name,
    )?;
    let table = BinaryTable::from_json("tests/cubic/test_binary.json", IdentifierOption::Name)?;
    let mut builder = MixtureBuilder::new(species[0].clone(), 0.88);
    for (s, x) in species[1..].iter().zip([0.06, 0.02, 0.025, 0.015]) {
        builder = builder.add_component(s.clone(), x);
    }
    Ok(builder.binary_table(Arc::new(table)).build()?)
}

fn molar_volume(mixture: &Mixture, p: f64, t: f64) -> Result<f64, Box<dyn Error>> {
    let rho0 = p / (mixture.specific_gas_constant() * t);
    let iteration = mixture.density_iteration(p, t, rho0, SolverOptions::new().tol(1e-13))?;
    Ok(mixture.molarweight() / iteration.density)
}

#[test]
fn isobaric_volume_derivatives() -> Result<(), Box<dyn Error>> {
    let mixture = natural_gas()?;
    let (p, t) = (5e6, 300.0);
    let v = molar_volume(&mixture, p, t)?;
    let state = mixture.state(mixture.molarweight() / v, t)?;

    let h = 1e-2;
    let dv_dt = (molar_volume(&mixture, p, t + h)? - molar_volume(&mixture, p, t - h)?) / (2.0 * h);
    assert_relative_eq!(state.dv_dt(), dv_dt, max_relative = 1e-6);

    let h = 0.5;
    let d2v_dt2 = (molar_volume(&mixture, p, t + h)? - 2.0 * v + molar_volume(&mixture, p, t - h)?)
        / (h * h);
    assert_relative_eq!(state.d2v_dt2(), d2v_dt2, max_relative = 1e-3);
    Ok(())
}

#[test]
fn isothermal_volume_derivatives() -> Result<(), Box<dyn Error>> {
    let mixture = natural_gas()?;
    let (p, t) = (8e6, 280.0);
    let v = molar_volume(&mixture, p, t)?;
    let state = mixture.state(mixture.molarweight() / v, t)?;

    let h = 1e2;
    let dv_dp = (molar_volume(&mixture, p + h, t)? - molar_volume(&mixture, p - h, t)?) / (2.0 * h);
    assert_relative_eq!(state.dv_dp(), dv_dp, max_relative = 1e-6);
    assert_relative_eq!(
        state.psi(),
        state.density * state.isothermal_compressibility(),
        max_relative = 1e-12
    );
    Ok(())
}

#[test]
fn compressibility_factor() -> Result<(), Box<dyn Error>> {
    let mixture = natural_gas()?;
    let r_spec = mixture.specific_gas_constant();
    assert_relative_eq!(r_spec * mixture.molarweight(), RGAS, max_relative = 1e-14);
    for (p, t) in [(1e5, 273.15), (2e6, 250.0), (7e6, 320.0)] {
        let rho = mixture.rho_ideal_gas_seeded(p, t)?;
        let z = mixture.z(p, t, rho)?;
        assert_relative_eq!(z * rho * r_spec * t, p, max_relative = 1e-12);
        assert!(z < 1.0);
        assert_relative_eq!(mixture.state(rho, t)?.compressibility(), z, max_relative = 1e-9);
    }
    Ok(())
}

#[test]
fn density_round_trip() -> Result<(), Box<dyn Error>> {
    let mixture = natural_gas()?;
    let t = 310.0;
    for rho0 in [0.1, 10.0, 80.0, 200.0] {
        let p = mixture.state(rho0, t)?.pressure();
        let rho = mixture.rho(p, t, rho0)?;
        assert_relative_eq!(rho, rho0, max_relative = 1e-8);
    }
    Ok(())
}

#[test]
fn departure_functions() -> Result<(), Box<dyn Error>> {
    let mixture = natural_gas()?;
    let t = 300.0;
    let rho = mixture.rho_ideal_gas_seeded(5e6, t)?;
    let state = mixture.state(rho, t)?;
    // attractive forces lower the internal energy and the entropy of the fluid
    assert!(state.residual_internal_energy() < 0.0);
    assert!(state.residual_entropy() < 0.0);

    let h = 1e-3;
    let up = mixture.state(rho, t + h)?.residual_internal_energy();
    let um = mixture.state(rho, t - h)?.residual_internal_energy();
    assert_relative_eq!(
        state.residual_isochoric_heat_capacity(),
        (up - um) / (2.0 * h),
        max_relative = 1e-6
    );
    Ok(())
}

#[test]
fn coefficients_are_cached_along_an_isotherm() -> Result<(), Box<dyn Error>> {
    let mixture = natural_gas()?;
    let t = 300.0;
    for rho in [1.0, 10.0, 100.0] {
        mixture.state(rho, t)?;
    }
    mixture.rho(5e6, t, 30.0)?;
    assert_eq!(mixture.mixing_evaluations(), 1);
    mixture.state(10.0, 301.0)?;
    assert_eq!(mixture.mixing_evaluations(), 2);
    Ok(())
}
