use super::{map_tx_error, not_found};
use crate::catalog::postgres::items::select_items_by_ids;
use async_trait::async_trait;
use nexa_contracts::catalog::RelationRepository;
use nexa_contracts::error::CoreResult;
use nexa_model::prelude::*;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgRelationRepository {
    pool: PgPool,
}

impl PgRelationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RelationRow {
    id: i64,
    kind: String,
    parent_item_id: Option<Uuid>,
    child_item_id: Option<Uuid>,
    person_id: Option<Uuid>,
    subject_item_id: Option<Uuid>,
    role: Option<String>,
    sort_order: i32,
}

fn parse_kind(s: &str) -> RelationKind {
    match s {
        "PARENT_OF" => RelationKind::ParentOf,
        "CONTAINS_EXTRA" => RelationKind::ContainsExtra,
        _ => RelationKind::PersonCredit,
    }
}

fn kind_key(k: RelationKind) -> &'static str {
    match k {
        RelationKind::ParentOf => "PARENT_OF",
        RelationKind::ContainsExtra => "CONTAINS_EXTRA",
        RelationKind::PersonCredit => "PERSON_CREDIT",
    }
}

fn credit_key(k: CreditKind) -> &'static str {
    match k {
        CreditKind::Cast => "CAST",
        CreditKind::Crew => "CREW",
    }
}

impl From<RelationRow> for Relation {
    fn from(row: RelationRow) -> Self {
        Relation {
            id: row.id,
            kind: parse_kind(&row.kind),
            parent_item_id: row.parent_item_id.map(Into::into),
            child_item_id: row.child_item_id.map(Into::into),
            person_id: row.person_id.map(Into::into),
            subject_item_id: row.subject_item_id.map(Into::into),
            role: row.role,
            sort_order: row.sort_order,
        }
    }
}

#[async_trait]
impl RelationRepository for PgRelationRepository {
    async fn children_of(&self, parent_id: MetadataItemId) -> CoreResult<Vec<MetadataItem>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "select child_item_id from relations where kind = 'PARENT_OF' and parent_item_id = $1 \
             and child_item_id is not null order by sort_order",
        )
        .bind(parent_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_tx_error)?;
        select_items_by_ids(&self.pool, &ids).await.map_err(map_tx_error)
    }

    async fn credits_for(&self, item_id: MetadataItemId, kind: CreditKind) -> CoreResult<Vec<Relation>> {
        let rows: Vec<RelationRow> = sqlx::query_as(
            "select id, kind, parent_item_id, child_item_id, person_id, subject_item_id, role, \
             sort_order from relations where kind = 'PERSON_CREDIT' and subject_item_id = $1 \
             and role = $2 order by sort_order",
        )
        .bind(item_id.as_uuid())
        .bind(credit_key(kind))
        .fetch_all(&self.pool)
        .await
        .map_err(map_tx_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, relation: Relation) -> CoreResult<Relation> {
        let id: i64 = sqlx::query_scalar(
            "insert into relations (kind, parent_item_id, child_item_id, person_id, \
             subject_item_id, role, sort_order) values ($1,$2,$3,$4,$5,$6,$7) returning id",
        )
        .bind(kind_key(relation.kind))
        .bind(relation.parent_item_id.map(|i| i.as_uuid()))
        .bind(relation.child_item_id.map(|i| i.as_uuid()))
        .bind(relation.person_id.map(|p| p.as_uuid()))
        .bind(relation.subject_item_id.map(|i| i.as_uuid()))
        .bind(&relation.role)
        .bind(relation.sort_order)
        .fetch_one(&self.pool)
        .await
        .map_err(map_tx_error)?;

        let row: Option<RelationRow> = sqlx::query_as(
            "select id, kind, parent_item_id, child_item_id, person_id, subject_item_id, role, \
             sort_order from relations where id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_tx_error)?;
        row.map(Into::into).ok_or_else(|| not_found("relation not found after insert"))
    }
}
