//! Serde adapters for `f64` values that must survive a JSON round trip.
//!
//! JSON has no literal for NaN or the infinities, and serde_json writes them
//! as `null`, which then fails to decode as `f64`. These adapters write
//! non-finite values as the strings `"NaN"`, `"Infinity"` and `"-Infinity"`
//! and read numbers, those strings, or `null` (as NaN).
//!
//! Use with `#[serde(with = "float::lossless")]` on `f64` fields and
//! `#[serde(with = "float::lossless_seq")]` on `Vec<f64>` fields.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// On-disk shape of a single value.
#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    Number(f64),
    Text(String),
    Null(()),
}

impl Repr {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            Repr::Number(v) => Ok(v),
            Repr::Null(()) => Ok(f64::NAN),
            Repr::Text(s) => s
                .parse::<f64>()
                .ok()
                .filter(|v| !v.is_finite())
                .ok_or_else(|| E::custom(format!("invalid non-finite float {:?}", s))),
        }
    }
}

/// Serializable view of one value.
struct Lossless(f64);

impl Serialize for Lossless {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let v = self.0;
        if v.is_finite() {
            serializer.serialize_f64(v)
        } else if v.is_nan() {
            serializer.serialize_str("NaN")
        } else if v > 0.0 {
            serializer.serialize_str("Infinity")
        } else {
            serializer.serialize_str("-Infinity")
        }
    }
}

pub mod lossless {
    use super::*;

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        Lossless(*value).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Repr::deserialize(deserializer)?.into_f64()
    }
}

pub mod lossless_seq {
    use super::*;

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|v| Lossless(*v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        Vec::<Repr>::deserialize(deserializer)?
            .into_iter()
            .map(|repr| repr.into_f64::<D::Error>())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "lossless")]
        value: f64,
        #[serde(with = "lossless_seq")]
        series: Vec<f64>,
    }

    #[test]
    fn test_finite_values_stay_numbers() {
        let json = serde_json::to_string(&Sample {
            value: 1.5,
            series: vec![2.0, -0.25],
        })
        .expect("serialize");
        assert_eq!(json, r#"{"value":1.5,"series":[2.0,-0.25]}"#);
    }

    #[test]
    fn test_non_finite_values_survive() {
        let json = serde_json::to_string(&Sample {
            value: f64::NAN,
            series: vec![f64::INFINITY, 3.0, f64::NEG_INFINITY],
        })
        .expect("serialize");
        assert_eq!(
            json,
            r#"{"value":"NaN","series":["Infinity",3.0,"-Infinity"]}"#
        );

        let back: Sample = serde_json::from_str(&json).expect("deserialize");
        assert!(back.value.is_nan());
        assert_eq!(back.series[0], f64::INFINITY);
        assert_eq!(back.series[1], 3.0);
        assert_eq!(back.series[2], f64::NEG_INFINITY);
    }

    #[test]
    fn test_null_and_integers_are_accepted() {
        let back: Sample =
            serde_json::from_str(r#"{"value":null,"series":[1,null]}"#).expect("deserialize");
        assert!(back.value.is_nan());
        assert_eq!(back.series[0], 1.0);
        assert!(back.series[1].is_nan());
    }

    #[test]
    fn test_finite_text_is_rejected() {
        assert!(serde_json::from_str::<Sample>(r#"{"value":"12","series":[]}"#).is_err());
        assert!(serde_json::from_str::<Sample>(r#"{"value":"fast","series":[]}"#).is_err());
    }
}
