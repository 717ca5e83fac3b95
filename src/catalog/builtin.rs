//! Built-in HealthKit catalog
//!
//! The recognized identifier table, grouped by category. Policies are listed
//! per identifier; nothing is inferred from identifier names.

use super::policy::AggregationPolicy::{self, Mean, MeanMinMax, Sum};

/// Category name, then `(metric id, policy)` pairs in display order
pub(crate) const HEALTHKIT_CATEGORIES: &[(&str, &[(&str, AggregationPolicy)])] = &[
    (
        "Activity",
        &[
            ("HKQuantityTypeIdentifierStepCount", Sum),
            ("HKQuantityTypeIdentifierDistanceWalkingRunning", Sum),
            ("HKQuantityTypeIdentifierFlightsClimbed", Mean),
            ("HKQuantityTypeIdentifierActiveEnergyBurned", Sum),
            ("HKQuantityTypeIdentifierBasalEnergyBurned", Sum),
        ],
    ),
    (
        "Vital Signs",
        &[
            ("HKQuantityTypeIdentifierHeartRate", MeanMinMax),
            ("HKQuantityTypeIdentifierRestingHeartRate", MeanMinMax),
            ("HKQuantityTypeIdentifierHeartRateVariabilitySDNN", MeanMinMax),
            ("HKQuantityTypeIdentifierOxygenSaturation", Mean),
            ("HKQuantityTypeIdentifierRespiratoryRate", Mean),
            ("HKQuantityTypeIdentifierBodyTemperature", Mean),
            ("HKQuantityTypeIdentifierBloodPressureSystolic", Mean),
            ("HKQuantityTypeIdentifierBloodPressureDiastolic", Mean),
        ],
    ),
    (
        "Body Measurements",
        &[
            ("HKQuantityTypeIdentifierHeight", Mean),
            ("HKQuantityTypeIdentifierBodyMass", Mean),
            ("HKQuantityTypeIdentifierBodyFatPercentage", Mean),
            ("HKQuantityTypeIdentifierLeanBodyMass", Mean),
            ("HKQuantityTypeIdentifierBodyMassIndex", Mean),
        ],
    ),
    ("Sleep", &[("HKCategoryTypeIdentifierSleepAnalysis", Mean)]),
    (
        "Nutrition",
        &[
            ("HKQuantityTypeIdentifierDietaryWater", Mean),
            // Energy-typed nutrition totals add up over the day
            ("HKQuantityTypeIdentifierDietaryEnergyConsumed", Sum),
            ("HKQuantityTypeIdentifierDietaryProtein", Mean),
            ("HKQuantityTypeIdentifierDietaryFatTotal", Mean),
            ("HKQuantityTypeIdentifierDietaryCarbohydrates", Mean),
        ],
    ),
    ("Mindfulness", &[("HKCategoryTypeIdentifierMindfulSession", Mean)]),
];
