//! Database seeder for Tijara development and testing.
//!
//! Seeds a demo branch with the default chart of accounts, the three
//! standard dimensions with sample values, one customer and a few posted
//! documents. Running it again only fills in what is missing.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tijara_core::dimension::{COST_CENTER, DEPARTMENT, DocumentDimensions, PROJECT};
use tijara_core::document::{GlAccountOverrides, SourceKind};
use tijara_core::ledger::{AccountRole, PaymentMode};
use tijara_core::posting::PostOutcome;
use tijara_db::entities::sea_orm_active_enums::PartyKind;
use tijara_db::repositories::{
    AccountRepository, BranchRepository, CreateDimensionValueInput, CreatePartyInput,
    DimensionRepository, NewDocumentLine, NewSourceDocument, PartyRepository, PostingRepository,
    RepositoryError, SourceDocumentRepository,
};
use tijara_shared::AppConfig;
use tijara_shared::types::{BranchId, DimensionValueId, PartyId, UserId};
use tracing::{info, warn};
use uuid::Uuid;

/// Demo branch code.
const DEMO_BRANCH: &str = "DEMO";
/// Actor recorded on everything the seeder writes.
const SEED_USER: Uuid = Uuid::from_u128(0x2);

/// Sample values per standard dimension.
const SAMPLE_VALUES: [(&str, &[(&str, &str)]); 3] = [
    (COST_CENTER, &[("CC-STORE", "Main Store"), ("CC-ONLINE", "Online Shop")]),
    (PROJECT, &[("PRJ-LAUNCH", "Spring Launch")]),
    (DEPARTMENT, &[("DEP-SALES", "Sales"), ("DEP-OPS", "Operations")]),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    tijara_shared::telemetry::init(&config.logging).context("failed to init tracing")?;

    let db = tijara_db::connect(&config.database.url)
        .await
        .context("failed to connect to database")?;
    info!("Connected to database");

    let branches = BranchRepository::new(db.clone());
    let (branch_id, created) = match branches.find_by_code(DEMO_BRANCH).await? {
        Some(branch) => (BranchId::from(branch.id), false),
        None => {
            let branch = branches.create(DEMO_BRANCH, "Demo Branch").await?;
            info!(branch_id = %branch.id, "Created demo branch");
            (BranchId::from(branch.id), true)
        }
    };

    let accounts = AccountRepository::new(db.clone(), config.ledger.clone());
    for role in AccountRole::ALL {
        let account = accounts.get_or_create(branch_id, role).await?;
        info!(code = %account.code, name = %account.name, "Account ready");
    }

    let cost_center = seed_dimensions(&DimensionRepository::new(db.clone()), branch_id).await?;

    if created {
        seed_documents(&db, &config, branch_id, cost_center).await?;
    } else {
        info!("Demo branch already existed, sample documents skipped");
    }

    info!("Seeding complete");
    Ok(())
}

/// Creates the standard dimensions and their sample values, and returns the
/// first cost center.
async fn seed_dimensions(
    dimensions: &DimensionRepository,
    branch_id: BranchId,
) -> anyhow::Result<Option<DimensionValueId>> {
    dimensions.ensure_standard(branch_id).await?;

    let mut first_cost_center = None;
    for (dimension_code, values) in SAMPLE_VALUES {
        let dimension = dimensions.find_dimension(branch_id, dimension_code).await?;
        for (code, name) in values {
            match dimensions
                .create_value(CreateDimensionValueInput {
                    dimension_id: dimension.id.into(),
                    code: (*code).to_string(),
                    name: (*name).to_string(),
                })
                .await
            {
                Ok(value) => {
                    info!(dimension = dimension_code, code, "Dimension value created");
                    if dimension_code == COST_CENTER && first_cost_center.is_none() {
                        first_cost_center = Some(value.id.into());
                    }
                }
                Err(RepositoryError::DuplicateCode(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(first_cost_center)
}

/// Registers and posts a cash sale, a credit invoice and a purchase.
async fn seed_documents(
    db: &DatabaseConnection,
    config: &AppConfig,
    branch_id: BranchId,
    cost_center: Option<DimensionValueId>,
) -> anyhow::Result<()> {
    let customer = PartyRepository::new(db.clone())
        .create(CreatePartyInput {
            branch_id,
            kind: PartyKind::Customer,
            name: "Delta Retail".to_string(),
            credit_limit: Some(Decimal::from(50_000)),
        })
        .await?;
    let customer_id = PartyId::from(customer.id);

    let documents = SourceDocumentRepository::new(db.clone(), config.ledger.clone());
    let samples = [
        ("S-0001", SourceKind::Sale, PaymentMode::Cash, None, 10, 100),
        ("I-0001", SourceKind::Invoice, PaymentMode::Credit, Some(customer_id), 4, 2_500),
        ("P-0001", SourceKind::Purchase, PaymentMode::Bank, None, 20, 40),
    ];
    for (number, kind, payment_mode, party_id, quantity, unit_price) in samples {
        let document = documents
            .create(NewSourceDocument {
                branch_id,
                kind,
                number: number.to_string(),
                document_date: NaiveDate::from_ymd_opt(2026, 3, 10).context("invalid date")?,
                payment_mode,
                party_id,
                dimensions: DocumentDimensions {
                    cost_center_id: cost_center,
                    ..DocumentDimensions::default()
                },
                gl_overrides: GlAccountOverrides::default(),
                lines: vec![NewDocumentLine {
                    product_id: Uuid::now_v7(),
                    description: format!("Sample goods for {number}"),
                    quantity: Decimal::from(quantity),
                    unit_price: Decimal::from(unit_price),
                    discount_rate: Decimal::ZERO,
                    vat_rate: None,
                }],
            })
            .await?;
        info!(number, total = %document.total_amount, "Sample document registered");
    }

    let report = PostingRepository::new(db.clone(), config.ledger.clone())
        .post_pending(branch_id, UserId::from_uuid(SEED_USER))
        .await?;
    for (document_id, outcome) in &report.outcomes {
        if let PostOutcome::Deferred { code, reason } = outcome {
            warn!(
                document_id = %document_id,
                code = %code,
                reason = %reason,
                "Sample document not posted"
            );
        }
    }
    info!(posted = report.posted_count(), "Sample documents posted");
    Ok(())
}
