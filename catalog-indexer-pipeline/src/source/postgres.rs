//! PostgreSQL implementation of the relational source.

use std::error::Error;
use std::fmt;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::task::JoinHandle;
use tokio_postgres::types::{FromSql, Type};
use tokio_postgres::{Client, Config as TokioPgConfig, NoTls, Row};
use tracing::{debug, error};

use super::table::{Cell, Column, ColumnKind, Table};
use super::{RelationalSource, SourceConnector};
use crate::errors::{PipelineError, SourceError};

/// Connection settings for the catalog database. Every field is required.
#[derive(Clone)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// Open a connection to the catalog database.
///
/// Any failure (authentication, network, DNS) is reported as a single
/// `ConnectionError` carrying the driver's message. There is no retry.
pub async fn acquire_connection(config: &PostgresConfig) -> Result<PostgresSource, PipelineError> {
    let mut pg_config = TokioPgConfig::new();
    pg_config
        .host(&config.host)
        .port(config.port)
        .user(&config.user)
        .password(config.password.as_str())
        .dbname(&config.database);

    let (client, connection) = pg_config.connect(NoTls).await.map_err(|e| {
        PipelineError::connection(format!("PostgreSQL service is not available: {}", e))
    })?;

    // The driver task finishes once the client is dropped.
    let driver = tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!(error = %e, "PostgreSQL connection error");
        }
    });

    debug!(host = %config.host, port = config.port, database = %config.database, "Connected to PostgreSQL");

    Ok(PostgresSource {
        client,
        _driver: driver,
    })
}

/// `SourceConnector` that opens a fresh PostgreSQL connection per run.
pub struct PostgresConnector {
    config: PostgresConfig,
}

impl PostgresConnector {
    pub fn new(config: PostgresConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SourceConnector for PostgresConnector {
    type Source = PostgresSource;

    async fn connect(&self) -> Result<PostgresSource, PipelineError> {
        acquire_connection(&self.config).await
    }
}

/// Sign word of a NUMERIC `'NaN'` on the wire.
const NUMERIC_NAN_SIGN: u16 = 0xC000;

/// A NUMERIC value with `'NaN'` read as missing.
///
/// `rust_decimal` has no NaN and refuses to decode it.
struct PgNumeric(Option<Decimal>);

impl<'a> FromSql<'a> for PgNumeric {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        // Layout: ndigits, weight, sign, dscale (i16 each), then digits.
        if raw.len() >= 6 && u16::from_be_bytes([raw[4], raw[5]]) == NUMERIC_NAN_SIGN {
            return Ok(Self(None));
        }
        Decimal::from_sql(ty, raw).map(|d| Self(Some(d)))
    }

    fn accepts(ty: &Type) -> bool {
        <Decimal as FromSql>::accepts(ty)
    }
}

/// A live connection to the catalog database.
pub struct PostgresSource {
    client: Client,
    _driver: JoinHandle<()>,
}

impl PostgresSource {
    fn column_kind(ty: &Type) -> Option<ColumnKind> {
        if *ty == Type::BOOL {
            Some(ColumnKind::Bool)
        } else if [Type::INT2, Type::INT4, Type::INT8].contains(ty) {
            Some(ColumnKind::Integer)
        } else if [Type::FLOAT4, Type::FLOAT8].contains(ty) {
            Some(ColumnKind::Float)
        } else if *ty == Type::NUMERIC {
            Some(ColumnKind::Decimal)
        } else if [Type::TEXT, Type::VARCHAR, Type::BPCHAR, Type::NAME].contains(ty) {
            Some(ColumnKind::Text)
        } else {
            None
        }
    }

    fn decode_cell(row: &Row, index: usize, ty: &Type, kind: ColumnKind) -> Result<Cell, SourceError> {
        let cell = match kind {
            ColumnKind::Bool => row.try_get::<_, Option<bool>>(index)?.map(Cell::Bool),
            ColumnKind::Integer if *ty == Type::INT2 => row
                .try_get::<_, Option<i16>>(index)?
                .map(|v| Cell::Integer(i64::from(v))),
            ColumnKind::Integer if *ty == Type::INT4 => row
                .try_get::<_, Option<i32>>(index)?
                .map(|v| Cell::Integer(i64::from(v))),
            ColumnKind::Integer => row.try_get::<_, Option<i64>>(index)?.map(Cell::Integer),
            ColumnKind::Float if *ty == Type::FLOAT4 => row
                .try_get::<_, Option<f32>>(index)?
                .map(|v| Cell::Float(f64::from(v))),
            ColumnKind::Float => row.try_get::<_, Option<f64>>(index)?.map(Cell::Float),
            ColumnKind::Decimal => row
                .try_get::<_, Option<PgNumeric>>(index)?
                .and_then(|n| n.0)
                .map(Cell::Decimal),
            ColumnKind::Text => row.try_get::<_, Option<String>>(index)?.map(Cell::Text),
        };
        Ok(cell.unwrap_or(Cell::Null))
    }
}

#[async_trait]
impl RelationalSource for PostgresSource {
    async fn view_definition(&self, view_name: &str) -> Result<Option<String>, SourceError> {
        let row = self
            .client
            .query_opt(
                "SELECT definition FROM pg_views WHERE viewname = $1 LIMIT 1",
                &[&view_name],
            )
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get::<_, Option<String>>(0)?.unwrap_or_default())),
            None => Ok(None),
        }
    }

    async fn execute(&self, statement: &str) -> Result<(), SourceError> {
        // Outside an explicit transaction each statement commits on success.
        self.client.batch_execute(statement).await?;
        Ok(())
    }

    async fn fetch_table(&self, query: &str) -> Result<Table, SourceError> {
        let statement = self.client.prepare(query).await?;

        let mut columns = Vec::with_capacity(statement.columns().len());
        let mut types = Vec::with_capacity(statement.columns().len());
        for column in statement.columns() {
            let kind = Self::column_kind(column.type_()).ok_or_else(|| {
                SourceError::new(format!(
                    "Unsupported type '{}' for column '{}'",
                    column.type_(),
                    column.name()
                ))
            })?;
            columns.push(Column::new(column.name(), kind));
            types.push(column.type_().clone());
        }

        let rows = self.client.query(&statement, &[]).await?;

        let mut table = Table::new(columns.clone());
        for row in &rows {
            let mut cells = Vec::with_capacity(columns.len());
            for (index, column) in columns.iter().enumerate() {
                cells.push(Self::decode_cell(row, index, &types[index], column.kind)?);
            }
            table.push_row(cells);
        }

        debug!(rows = table.len(), columns = columns.len(), "Fetched table");
        Ok(table)
    }
}
