//! Serde adapters and file helpers for the public artifacts.
//!
//! Curve points travel as hex encoded compressed points, field elements as decimal strings.
//! Decoding always validates: a point must decode to a curve point and a field element must be canonical.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use halo2_proofs::halo2curves::{bn256::Fr as Fp, group::GroupEncoding};
use serde::{de::DeserializeOwned, Serialize};

use super::operation_helpers::{decimal_to_fp, fp_to_decimal};
use crate::errors::ArtifactError;

pub fn point_to_hex<C: GroupEncoding>(point: &C) -> String {
    hex::encode(point.to_bytes().as_ref())
}

pub fn point_from_hex<C: GroupEncoding>(encoded: &str) -> Result<C, ArtifactError> {
    let bytes = hex::decode(encoded.trim_start_matches("0x"))
        .map_err(|e| ArtifactError::Encoding(format!("invalid hex point: {}", e)))?;

    let mut repr = C::Repr::default();
    if repr.as_ref().len() != bytes.len() {
        return Err(ArtifactError::Encoding(format!(
            "point encoding must be {} bytes, got {}",
            repr.as_ref().len(),
            bytes.len()
        )));
    }
    repr.as_mut().copy_from_slice(&bytes);

    Option::from(C::from_bytes(&repr))
        .ok_or_else(|| ArtifactError::Encoding("bytes do not encode a curve point".to_owned()))
}

pub fn fp_from_decimal(encoded: &str) -> Result<Fp, ArtifactError> {
    decimal_to_fp(encoded).ok_or_else(|| {
        ArtifactError::Encoding(format!("{} is not a canonical field element", encoded))
    })
}

pub mod hex_point {
    use halo2_proofs::halo2curves::group::GroupEncoding;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<C: GroupEncoding, S: Serializer>(
        point: &C,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::point_to_hex(point))
    }

    pub fn deserialize<'de, C: GroupEncoding, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<C, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        super::point_from_hex(&encoded).map_err(D::Error::custom)
    }
}

pub mod hex_points {
    use halo2_proofs::halo2curves::group::GroupEncoding;
    use serde::{de::Error, ser::SerializeSeq, Deserialize, Deserializer, Serializer};

    pub fn serialize<C: GroupEncoding, S: Serializer>(
        points: &[C],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(points.len()))?;
        for point in points {
            seq.serialize_element(&super::point_to_hex(point))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, C: GroupEncoding, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<C>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|encoded| super::point_from_hex(encoded).map_err(D::Error::custom))
            .collect()
    }
}

pub mod decimal_fp {
    use halo2_proofs::halo2curves::bn256::Fr as Fp;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Fp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::fp_to_decimal(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Fp, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        super::fp_from_decimal(&encoded).map_err(D::Error::custom)
    }
}

pub mod hex_digest {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(digest: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(digest))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let encoded = String::deserialize(deserializer)?;
        let bytes = hex::decode(&encoded).map_err(D::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| D::Error::custom("digest must be 32 bytes"))
    }
}

pub fn save_json<P: AsRef<Path>, T: Serialize>(path: P, data: &T) -> Result<(), ArtifactError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, data)?;
    writer.flush()?;
    Ok(())
}

pub fn load_json<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<T, ArtifactError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

pub fn save_bincode<P: AsRef<Path>, T: Serialize>(path: P, data: &T) -> Result<(), ArtifactError> {
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, data)?;
    writer.flush()?;
    Ok(())
}

pub fn load_bincode<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<T, ArtifactError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(bincode::deserialize_from(reader)?)
}
