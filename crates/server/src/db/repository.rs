use std::collections::HashMap;

use chrono::{DateTime, Utc};
use clinsight_core::{
    ClusterCount, ClusterMember, ClusterMethod, Encounter, Episode, Patient, PatientListing,
    PatientRecord,
};
use deadpool_postgres::Pool;
use tokio_postgres::Row;

use super::PatientStore;
use crate::error::AppError;

const LISTING_COLUMNS: &str = "p.id, p.first, p.last, p.birthdate, p.gender, \
     p.kmeans_cluster, p.dbscan_cluster, \
     (SELECT COUNT(*) FROM condition c WHERE c.patient_id = p.id) AS condition_count, \
     (SELECT COUNT(*) FROM medication m WHERE m.patient_id = p.id) AS medication_count";

/// PostgreSQL-backed patient store
#[derive(Clone)]
pub struct PatientRepository {
    pool: Pool,
}

impl PatientRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn patient_from_row(row: &Row) -> Patient {
    Patient {
        id: row.get("id"),
        birthdate: row.get("birthdate"),
        deathdate: row.get("deathdate"),
        first: row.get("first"),
        last: row.get("last"),
        gender: row.get("gender"),
        race: row.get("race"),
        ethnicity: row.get("ethnicity"),
        kmeans_cluster: row.get("kmeans_cluster"),
        dbscan_cluster: row.get("dbscan_cluster"),
    }
}

fn episode_from_row(row: &Row) -> Episode {
    Episode {
        code: row.get("code"),
        description: row.get::<_, Option<String>>("description").unwrap_or_default(),
        start: row.get::<_, DateTime<Utc>>("start_at"),
        stop: row.get("stop_at"),
    }
}

fn encounter_from_row(row: &Row) -> Encounter {
    Encounter {
        code: row.get("code"),
        description: row.get::<_, Option<String>>("description").unwrap_or_default(),
        reason_code: row.get("reason_code"),
        start: row.get("start_at"),
    }
}

fn listing_from_row(row: &Row) -> PatientListing {
    PatientListing {
        id: row.get("id"),
        first: row.get("first"),
        last: row.get("last"),
        birthdate: row.get("birthdate"),
        gender: row.get("gender"),
        kmeans_cluster: row.get("kmeans_cluster"),
        dbscan_cluster: row.get("dbscan_cluster"),
        condition_count: row.get("condition_count"),
        medication_count: row.get("medication_count"),
    }
}

impl PatientStore for PatientRepository {
    async fn find_patient(&self, id: &str) -> Result<Option<PatientRecord>, AppError> {
        let client = self.pool.get().await?;
        let Some(row) = client
            .query_opt("SELECT * FROM patient WHERE id = $1", &[&id])
            .await?
        else {
            return Ok(None);
        };
        let patient = patient_from_row(&row);

        let conditions = client
            .query(
                "SELECT code, description, start_at, stop_at FROM condition \
                 WHERE patient_id = $1 ORDER BY start_at, id",
                &[&id],
            )
            .await?
            .iter()
            .map(episode_from_row)
            .collect();
        let medications = client
            .query(
                "SELECT code, description, start_at, stop_at FROM medication \
                 WHERE patient_id = $1 ORDER BY start_at, id",
                &[&id],
            )
            .await?
            .iter()
            .map(episode_from_row)
            .collect();
        let encounters = client
            .query(
                "SELECT code, description, reason_code, start_at FROM encounter \
                 WHERE patient_id = $1 ORDER BY start_at, id",
                &[&id],
            )
            .await?
            .iter()
            .map(encounter_from_row)
            .collect();

        Ok(Some(PatientRecord {
            patient,
            conditions,
            medications,
            encounters,
        }))
    }

    async fn find_cluster_members(
        &self,
        method: ClusterMethod,
        cluster_id: i32,
    ) -> Result<Vec<ClusterMember>, AppError> {
        let client = self.pool.get().await?;
        // column name comes from a closed enum, never from the caller
        let column = method.column();

        let rows = client
            .query(
                &format!("SELECT id, birthdate FROM patient WHERE {column} = $1 ORDER BY id"),
                &[&cluster_id],
            )
            .await?;
        let mut members: Vec<ClusterMember> = rows
            .iter()
            .map(|row| ClusterMember {
                id: row.get("id"),
                birthdate: row.get("birthdate"),
                conditions: Vec::new(),
                medications: Vec::new(),
            })
            .collect();
        if members.is_empty() {
            return Ok(members);
        }

        let slots: HashMap<String, usize> = members
            .iter()
            .enumerate()
            .map(|(slot, m)| (m.id.clone(), slot))
            .collect();

        fn conditions(m: &mut ClusterMember) -> &mut Vec<String> {
            &mut m.conditions
        }
        fn medications(m: &mut ClusterMember) -> &mut Vec<String> {
            &mut m.medications
        }
        let targets: [(&str, fn(&mut ClusterMember) -> &mut Vec<String>); 2] =
            [("condition", conditions), ("medication", medications)];
        for (table, target) in targets {
            let rows = client
                .query(
                    &format!(
                        "SELECT t.patient_id, t.description FROM {table} t \
                         JOIN patient p ON p.id = t.patient_id \
                         WHERE p.{column} = $1 AND t.description IS NOT NULL \
                         ORDER BY t.patient_id, t.id"
                    ),
                    &[&cluster_id],
                )
                .await?;
            for row in rows {
                let patient_id: String = row.get("patient_id");
                let Some(&slot) = slots.get(&patient_id) else {
                    continue;
                };
                target(&mut members[slot]).push(row.get("description"));
            }
        }

        Ok(members)
    }

    async fn cluster_counts(&self, method: ClusterMethod) -> Result<Vec<ClusterCount>, AppError> {
        let client = self.pool.get().await?;
        let column = method.column();
        let rows = client
            .query(
                &format!(
                    "SELECT {column} AS cluster_id, COUNT(*) AS patient_count FROM patient \
                     WHERE {column} IS NOT NULL GROUP BY {column} ORDER BY {column}"
                ),
                &[],
            )
            .await?;

        Ok(rows
            .iter()
            .map(|row| ClusterCount {
                cluster_id: row.get("cluster_id"),
                patient_count: row.get("patient_count"),
            })
            .collect())
    }

    async fn list_patients(&self) -> Result<Vec<PatientListing>, AppError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                &format!("SELECT {LISTING_COLUMNS} FROM patient p ORDER BY p.id"),
                &[],
            )
            .await?;
        Ok(rows.iter().map(listing_from_row).collect())
    }

    async fn list_cluster_patients(
        &self,
        method: ClusterMethod,
        cluster_id: i32,
    ) -> Result<Vec<PatientListing>, AppError> {
        let client = self.pool.get().await?;
        let column = method.column();
        let rows = client
            .query(
                &format!(
                    "SELECT {LISTING_COLUMNS} FROM patient p WHERE p.{column} = $1 ORDER BY p.id"
                ),
                &[&cluster_id],
            )
            .await?;
        Ok(rows.iter().map(listing_from_row).collect())
    }
}
