use parquet_format_safe as format;
use parquet_format_safe::{DecimalType, IntType, TimeType, TimestampType};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Milliseconds,
    Microseconds,
    Nanoseconds,
}

impl From<format::TimeUnit> for TimeUnit {
    fn from(unit: format::TimeUnit) -> Self {
        match unit {
            format::TimeUnit::MILLIS(_) => TimeUnit::Milliseconds,
            format::TimeUnit::MICROS(_) => TimeUnit::Microseconds,
            format::TimeUnit::NANOS(_) => TimeUnit::Nanoseconds,
        }
    }
}

impl From<TimeUnit> for format::TimeUnit {
    fn from(unit: TimeUnit) -> Self {
        match unit {
            TimeUnit::Milliseconds => format::TimeUnit::MILLIS(Default::default()),
            TimeUnit::Microseconds => format::TimeUnit::MICROS(Default::default()),
            TimeUnit::Nanoseconds => format::TimeUnit::NANOS(Default::default()),
        }
    }
}

/// The set of logical integer annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
}

impl IntegerType {
    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            IntegerType::Int8 | IntegerType::Int16 | IntegerType::Int32 | IntegerType::Int64
        )
    }

    pub fn bit_width(&self) -> usize {
        match self {
            IntegerType::Int8 | IntegerType::UInt8 => 8,
            IntegerType::Int16 | IntegerType::UInt16 => 16,
            IntegerType::Int32 | IntegerType::UInt32 => 32,
            IntegerType::Int64 | IntegerType::UInt64 => 64,
        }
    }
}

impl From<(i32, bool)> for IntegerType {
    fn from((bit_width, is_signed): (i32, bool)) -> Self {
        match (bit_width, is_signed) {
            (8, true) => IntegerType::Int8,
            (16, true) => IntegerType::Int16,
            (32, true) => IntegerType::Int32,
            (64, true) => IntegerType::Int64,
            (8, false) => IntegerType::UInt8,
            (16, false) => IntegerType::UInt16,
            (32, false) => IntegerType::UInt32,
            (64, false) => IntegerType::UInt64,
            // any other bit width deviates from the parquet spec: fall back
            // to a plain signed 32
            _ => IntegerType::Int32,
        }
    }
}

/// Logical annotations of leaf (primitive) fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveLogicalType {
    String,
    Enum,
    /// (precision, scale)
    Decimal(usize, usize),
    Date,
    Time {
        unit: TimeUnit,
        is_adjusted_to_utc: bool,
    },
    Timestamp {
        unit: TimeUnit,
        is_adjusted_to_utc: bool,
    },
    Integer(IntegerType),
    Unknown,
    Json,
    Bson,
    Uuid,
}

/// Logical annotations of group fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupLogicalType {
    Map,
    List,
}

impl TryFrom<format::LogicalType> for PrimitiveLogicalType {
    type Error = Error;

    fn try_from(type_: format::LogicalType) -> Result<Self, Self::Error> {
        Ok(match type_ {
            format::LogicalType::STRING(_) => PrimitiveLogicalType::String,
            format::LogicalType::ENUM(_) => PrimitiveLogicalType::Enum,
            format::LogicalType::DECIMAL(decimal) => PrimitiveLogicalType::Decimal(
                decimal.precision.try_into()?,
                decimal.scale.try_into()?,
            ),
            format::LogicalType::DATE(_) => PrimitiveLogicalType::Date,
            format::LogicalType::TIME(time) => PrimitiveLogicalType::Time {
                unit: time.unit.into(),
                is_adjusted_to_utc: time.is_adjusted_to_u_t_c,
            },
            format::LogicalType::TIMESTAMP(time) => PrimitiveLogicalType::Timestamp {
                unit: time.unit.into(),
                is_adjusted_to_utc: time.is_adjusted_to_u_t_c,
            },
            format::LogicalType::INTEGER(int) => {
                PrimitiveLogicalType::Integer((int.bit_width as i32, int.is_signed).into())
            }
            format::LogicalType::UNKNOWN(_) => PrimitiveLogicalType::Unknown,
            format::LogicalType::JSON(_) => PrimitiveLogicalType::Json,
            format::LogicalType::BSON(_) => PrimitiveLogicalType::Bson,
            format::LogicalType::UUID(_) => PrimitiveLogicalType::Uuid,
            _ => return Err(Error::oos("LogicalType value out of range")),
        })
    }
}

impl TryFrom<format::LogicalType> for GroupLogicalType {
    type Error = Error;

    fn try_from(type_: format::LogicalType) -> Result<Self, Self::Error> {
        Ok(match type_ {
            format::LogicalType::LIST(_) => GroupLogicalType::List,
            format::LogicalType::MAP(_) => GroupLogicalType::Map,
            _ => return Err(Error::oos("LogicalType value out of range")),
        })
    }
}

impl From<PrimitiveLogicalType> for format::LogicalType {
    fn from(type_: PrimitiveLogicalType) -> Self {
        match type_ {
            PrimitiveLogicalType::String => format::LogicalType::STRING(Default::default()),
            PrimitiveLogicalType::Enum => format::LogicalType::ENUM(Default::default()),
            PrimitiveLogicalType::Decimal(precision, scale) => {
                format::LogicalType::DECIMAL(DecimalType {
                    precision: precision as i32,
                    scale: scale as i32,
                })
            }
            PrimitiveLogicalType::Date => format::LogicalType::DATE(Default::default()),
            PrimitiveLogicalType::Time {
                unit,
                is_adjusted_to_utc,
            } => format::LogicalType::TIME(TimeType {
                unit: unit.into(),
                is_adjusted_to_u_t_c: is_adjusted_to_utc,
            }),
            PrimitiveLogicalType::Timestamp {
                unit,
                is_adjusted_to_utc,
            } => format::LogicalType::TIMESTAMP(TimestampType {
                unit: unit.into(),
                is_adjusted_to_u_t_c: is_adjusted_to_utc,
            }),
            PrimitiveLogicalType::Integer(integer) => format::LogicalType::INTEGER(IntType {
                bit_width: integer.bit_width() as i8,
                is_signed: integer.is_signed(),
            }),
            PrimitiveLogicalType::Unknown => format::LogicalType::UNKNOWN(Default::default()),
            PrimitiveLogicalType::Json => format::LogicalType::JSON(Default::default()),
            PrimitiveLogicalType::Bson => format::LogicalType::BSON(Default::default()),
            PrimitiveLogicalType::Uuid => format::LogicalType::UUID(Default::default()),
        }
    }
}

impl From<GroupLogicalType> for format::LogicalType {
    fn from(type_: GroupLogicalType) -> Self {
        match type_ {
            GroupLogicalType::Map => format::LogicalType::MAP(Default::default()),
            GroupLogicalType::List => format::LogicalType::LIST(Default::default()),
        }
    }
}
