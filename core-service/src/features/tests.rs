//! Integration Tests for the full blood panel
//!
//! Exercises the default 24-field layout end to end through the codec.

#[cfg(test)]
mod integration_tests {
    use crate::features::{encode, FeatureSchema, MeasurementSet, DEFAULT_FEATURE_COUNT, DEFAULT_FEATURE_LAYOUT};

    /// One plausible panel, values in layout order
    const PANEL: [f64; DEFAULT_FEATURE_COUNT] = [
        113.28, 214.44, 11.62, 256000.0, 7200.0, 4.4, 41.0, 88.0, 29.5, 33.6,
        12.0, 23.9, 118.0, 76.0, 132.0, 5.4, 96.0, 52.0, 24.0, 21.0,
        72.0, 0.9, 0.01, 1.2,
    ];

    fn full_panel() -> MeasurementSet {
        DEFAULT_FEATURE_LAYOUT
            .iter()
            .zip(PANEL.iter())
            .map(|(name, value)| (*name, *value))
            .collect()
    }

    #[test]
    fn test_full_panel_encodes_in_layout_order() {
        let vector = encode(&full_panel(), &FeatureSchema::default_layout()).unwrap();

        assert_eq!(vector.len(), DEFAULT_FEATURE_COUNT);
        assert_eq!(vector.as_slice(), &PANEL[..]);
    }

    #[test]
    fn test_each_single_omission_is_named() {
        let schema = FeatureSchema::default_layout();

        for name in DEFAULT_FEATURE_LAYOUT {
            let panel: MeasurementSet = DEFAULT_FEATURE_LAYOUT
                .iter()
                .zip(PANEL.iter())
                .filter(|(field, _)| *field != name)
                .map(|(field, value)| (*field, *value))
                .collect();

            let err = encode(&panel, &schema).unwrap_err();
            assert_eq!(err.missing_fields, vec![name.to_string()]);
        }
    }

    #[test]
    fn test_empty_input_lists_whole_schema() {
        let err = encode(&MeasurementSet::new(), &FeatureSchema::default_layout()).unwrap_err();

        assert_eq!(err.missing_fields.len(), DEFAULT_FEATURE_COUNT);
        assert_eq!(err.missing_fields[0], "Glucose");
        assert_eq!(err.missing_fields[23], "C-reactive Protein");
    }

    #[test]
    fn test_custom_schema_reorders_vector() {
        let schema = FeatureSchema::new(vec!["BMI".into(), "Glucose".into()]).unwrap();
        let vector = encode(&full_panel(), &schema).unwrap();

        assert_eq!(vector.as_slice(), &[23.9, 113.28]);
        assert_eq!(vector.to_log_entry(&schema)["named_values"]["BMI"], 23.9);
    }
}
