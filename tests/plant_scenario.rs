//! Reference plant scenario: 25 ML/d municipal wastewater through the full
//! primary settler, activated sludge, nitrification and denitrification train.

use approx::assert_relative_eq;
use wwtp::prelude::*;

fn raw_influent() -> Stream {
    Stream::new(
        25.0,
        Components {
            s_vfa: 50.0,
            s_fbso: 115.0,
            x_bpo: 440.0,
            x_upo: 100.0,
            s_uso: 45.0,
            x_iss: 60.0,
            s_nh4: 39.1,
            s_po4: 7.28,
            ..Default::default()
        },
    )
    .unwrap()
}

mod reference_design {
    use super::*;

    #[test]
    fn test_primary_effluent() {
        let out = Plant::default().run(&raw_influent()).unwrap();
        let primary = out.primary.as_ref().unwrap();
        assert_relative_eq!(primary.effluent.flow(), 24.875, epsilon = 1e-9);
        assert_relative_eq!(primary.effluent.get(Component::Bpo), 255.0, max_relative = 1e-3);
        assert_relative_eq!(primary.effluent.get(Component::Upo), 10.0, max_relative = 1e-3);
        assert_relative_eq!(primary.effluent.get(Component::Iss), 15.0, max_relative = 1e-3);
    }

    #[test]
    fn test_final_effluent() {
        let out = Plant::default().run(&raw_influent()).unwrap();
        let effluent = out.effluent();
        assert_relative_eq!(effluent.flow(), 24.310113, max_relative = 1e-6);
        assert_relative_eq!(effluent.get(Component::Nh4), 1.5533, max_relative = 1e-3);
        assert_relative_eq!(effluent.get(Component::Nox), 5.2962, max_relative = 1e-3);
        assert_relative_eq!(effluent.get(Component::Po4), 0.1362, max_relative = 1e-2);
        assert_eq!(effluent.get(Component::Oho), 0.0);
    }

    #[test]
    fn test_reported_design_variables() {
        let report = Plant::default().run(&raw_influent()).unwrap().report();
        let carbon = &report.carbon_removal;
        assert_relative_eq!(carbon.value("MX_T").unwrap(), 73646.0, max_relative = 1e-3);
        assert_relative_eq!(carbon.value("FOc").unwrap(), 7545.57, max_relative = 1e-3);

        let dn = report.denitrification.as_ref().unwrap();
        assert_relative_eq!(dn.value("a_opt").unwrap(), 5.5909, max_relative = 1e-3);
        assert_relative_eq!(dn.value("TNe").unwrap(), 8.2871, max_relative = 1e-3);
        assert_relative_eq!(dn.value("FOt").unwrap(), 9593.36, max_relative = 1e-3);
        assert_relative_eq!(dn.value("effluent_alk").unwrap(), 98.18, max_relative = 1e-3);

        let nit = report.nitrification.as_ref().unwrap();
        assert_relative_eq!(nit.value("fxm").unwrap(), 0.4572, max_relative = 1e-3);
    }

    #[test]
    fn test_without_primary_settler() {
        let plant = Plant::new(
            Configuration {
                primary_settler: false,
                ..Default::default()
            },
            PlantParameters::default(),
        );
        let out = plant.run(&raw_influent()).unwrap();
        assert_relative_eq!(out.effluent().get(Component::Nox), 5.388, max_relative = 1e-3);
        let carbon = out.report().carbon_removal;
        assert_relative_eq!(carbon.value("MX_T").unwrap(), 126849.0, max_relative = 1e-3);
    }
}

mod plant_files {
    use super::*;

    #[test]
    fn test_short_names() {
        let plant = Plant::from_toml_str(
            r#"
balance_mode = "diagnostic"

[configuration]
dn = false

[parameters.carbon_removal]
T = 16.0
Rs = 15.0

[parameters.chemical_p_removal]
mass_FeCl3 = 0.0
"#,
        )
        .unwrap();
        assert_eq!(plant.balance_mode, BalanceMode::Diagnostic);

        let out = plant.run(&raw_influent()).unwrap();
        assert!(out.violations.is_empty());
        let effluent = out.effluent();
        assert_relative_eq!(effluent.get(Component::Nh4), 1.5533, max_relative = 1e-3);
        assert_relative_eq!(effluent.get(Component::Nox), 39.192, max_relative = 1e-3);
        assert_relative_eq!(effluent.get(Component::Po4), 7.5596, max_relative = 1e-3);
    }

    #[test]
    fn test_named_precipitation_model() {
        let plant = Plant::from_toml_str(
            r#"
[parameters.chemical_p_removal.model]
type = "Equilibrium"
metal = "Al"
ph = 7.0
"#,
        )
        .unwrap();
        let out = plant.run(&raw_influent()).unwrap();
        let po4 = out.effluent().get(Component::Po4);
        assert!((0.0..=7.5596).contains(&po4), "{po4}");
    }

    #[test]
    fn test_round_trip_reproduces_run() {
        let mut parameters = PlantParameters::default();
        parameters.carbon_removal.sludge_age = 18.0;
        parameters.nitrification.dissolved_oxygen = 1.5;
        parameters.denitrification.internal_recirculation = 4.0;
        let plant = Plant::new(Configuration::default(), parameters)
            .with_balance_mode(BalanceMode::Diagnostic);

        let source = plant.to_toml_string().unwrap();
        let reloaded = Plant::from_toml_str(&source).unwrap();
        assert_eq!(reloaded.parameters.carbon_removal.sludge_age, 18.0);
        assert_eq!(reloaded.balance_mode, BalanceMode::Diagnostic);

        let first = plant.run(&raw_influent()).unwrap();
        let second = reloaded.run(&raw_influent()).unwrap();
        assert_eq!(first.effluent(), second.effluent());
        assert_eq!(first.report(), second.report());
    }

    #[test]
    fn test_short_sludge_age_is_infeasible() {
        let plant = Plant::from_toml_str("[parameters.carbon_removal]\nRs = 3.0\n").unwrap();
        let err = plant.run(&raw_influent()).unwrap_err();
        assert!(
            matches!(
                err,
                WwtpError::Infeasible(Infeasibility::SludgeAgeTooShort { .. })
            ),
            "{err:?}"
        );
    }
}
