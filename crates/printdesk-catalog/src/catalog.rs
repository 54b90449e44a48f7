//! File-backed catalog handle.

use crate::custom_size::{CustomSizeRequest, SizeResolution, resolve_or_create_in};
use crate::error::CatalogError;
use crate::resolver::{
    SpecificationView, compatible_sizes_in, compatible_weights_in, specification_for_in,
};
use crate::seed::{SeedReport, seed_standard_sizes_in};
use printdesk_access::{Capability, Grant};
use printdesk_store::{
    Ledger, LockPolicy, Millimeters, PaperSize, PaperType, PaperWeight, ProductType,
    ProductTypeSpecification, SizeSeries, mutate_ledger_jsonl, read_ledger_jsonl,
};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct PaperCatalog {
    ledger_path: PathBuf,
    lock: LockPolicy,
}

impl PaperCatalog {
    pub fn new(ledger_path: impl Into<PathBuf>) -> Self {
        Self {
            ledger_path: ledger_path.into(),
            lock: LockPolicy::default(),
        }
    }

    pub fn with_lock_policy(mut self, lock: LockPolicy) -> Self {
        self.lock = lock;
        self
    }

    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    fn read(&self, grant: &Grant) -> Result<Ledger, CatalogError> {
        grant.require(Capability::BrowseCatalog)?;
        Ok(read_ledger_jsonl(&self.ledger_path)?)
    }

    /// Run one admin write; any successful write is persisted.
    fn administer<T>(
        &self,
        grant: &Grant,
        write: impl FnOnce(&mut Ledger) -> Result<T, CatalogError>,
    ) -> Result<T, CatalogError> {
        grant.require(Capability::ManageCatalog)?;
        let value = mutate_ledger_jsonl(&self.ledger_path, &self.lock, |ledger| {
            write(ledger).map(|value| (value, true))
        })?;
        Ok(value)
    }

    // ── Resolver ──

    pub fn compatible_weights(
        &self,
        grant: &Grant,
        paper_type_id: u64,
    ) -> Result<Vec<PaperWeight>, CatalogError> {
        compatible_weights_in(&self.read(grant)?, paper_type_id)
    }

    pub fn compatible_sizes(
        &self,
        grant: &Grant,
        paper_weight_id: Option<u64>,
    ) -> Result<Vec<PaperSize>, CatalogError> {
        compatible_sizes_in(&self.read(grant)?, paper_weight_id)
    }

    pub fn specification_for(
        &self,
        grant: &Grant,
        product_type_id: u64,
    ) -> Result<SpecificationView, CatalogError> {
        specification_for_in(&self.read(grant)?, product_type_id)
    }

    /// Lock-scoped, so concurrent identical requests yield a single row.
    pub fn resolve_or_create_size(
        &self,
        grant: &Grant,
        request: &CustomSizeRequest,
    ) -> Result<SizeResolution, CatalogError> {
        grant.require(Capability::CreateCustomSize)?;
        let resolution = mutate_ledger_jsonl(&self.ledger_path, &self.lock, |ledger| {
            resolve_or_create_in(ledger, request)
        })?;
        Ok(resolution)
    }

    // ── Administration ──

    pub fn add_product_type(
        &self,
        grant: &Grant,
        name: &str,
        description: &str,
    ) -> Result<ProductType, CatalogError> {
        self.administer(grant, |ledger| {
            Ok(ledger.add_product_type(name, description)?.clone())
        })
    }

    pub fn add_paper_type(
        &self,
        grant: &Grant,
        name: &str,
        description: &str,
    ) -> Result<PaperType, CatalogError> {
        self.administer(grant, |ledger| {
            Ok(ledger.add_paper_type(name, description)?.clone())
        })
    }

    pub fn add_paper_weight(
        &self,
        grant: &Grant,
        gsm: u32,
        paper_type_ids: &[u64],
    ) -> Result<PaperWeight, CatalogError> {
        if gsm == 0 {
            return Err(CatalogError::ValidationFailed(
                "gsm must be greater than zero".to_string(),
            ));
        }
        self.administer(grant, |ledger| {
            Ok(ledger.add_paper_weight(gsm, paper_type_ids)?.clone())
        })
    }

    pub fn add_paper_size(
        &self,
        grant: &Grant,
        name: &str,
        series: SizeSeries,
        width_mm: Millimeters,
        height_mm: Millimeters,
        paper_weight_ids: &[u64],
    ) -> Result<PaperSize, CatalogError> {
        if width_mm.is_zero() || height_mm.is_zero() {
            return Err(CatalogError::ValidationFailed(
                "dimensions must be greater than zero".to_string(),
            ));
        }
        self.administer(grant, |ledger| {
            Ok(ledger
                .add_paper_size(name, series, width_mm, height_mm, paper_weight_ids)?
                .clone())
        })
    }

    /// Returns whether the edge was new.
    pub fn link_weight_to_paper_type(
        &self,
        grant: &Grant,
        paper_weight_id: u64,
        paper_type_id: u64,
    ) -> Result<bool, CatalogError> {
        self.administer(grant, |ledger| {
            Ok(ledger.link_weight_to_paper_type(paper_weight_id, paper_type_id)?)
        })
    }

    /// Returns whether the edge was new.
    pub fn link_size_to_weight(
        &self,
        grant: &Grant,
        paper_size_id: u64,
        paper_weight_id: u64,
    ) -> Result<bool, CatalogError> {
        self.administer(grant, |ledger| {
            Ok(ledger.link_size_to_weight(paper_size_id, paper_weight_id)?)
        })
    }

    /// Replace the specification override for a product type.
    pub fn set_specification(
        &self,
        grant: &Grant,
        spec: ProductTypeSpecification,
    ) -> Result<ProductTypeSpecification, CatalogError> {
        self.administer(grant, |ledger| Ok(ledger.set_specification(spec)?.clone()))
    }

    pub fn seed_standard_sizes(&self, grant: &Grant) -> Result<SeedReport, CatalogError> {
        grant.require(Capability::ManageCatalog)?;
        let report = mutate_ledger_jsonl(&self.ledger_path, &self.lock, |ledger| {
            let report = seed_standard_sizes_in(ledger).map_err(CatalogError::from)?;
            Ok::<_, CatalogError>((report, report.changed()))
        })?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printdesk_access::{Principal, Role, authorize};
    use std::collections::BTreeSet;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_ledger_path(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let root = std::env::temp_dir().join(format!(
            "printdesk-catalog-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&root).expect("temp dir should be created");
        root.join("ledger.jsonl")
    }

    fn grant(role: Role, capability: Capability) -> Grant {
        authorize(&Principal::new("tester", role), capability).expect("role should be allowed")
    }

    fn admin() -> Grant {
        grant(Role::Superuser, Capability::ManageCatalog)
    }

    #[test]
    fn admin_writes_persist_and_feed_the_resolver() {
        let catalog = PaperCatalog::new(temp_ledger_path("admin"));
        let admin = admin();

        let flyers = catalog
            .add_product_type(&admin, "Flyers", "A5 handouts")
            .expect("product type should add");
        let gloss = catalog
            .add_paper_type(&admin, "Gloss", "")
            .expect("paper type should add");
        let heavy = catalog
            .add_paper_weight(&admin, 300, &[gloss.id])
            .expect("weight should add");
        let light = catalog
            .add_paper_weight(&admin, 130, &[])
            .expect("weight should add");
        assert!(
            catalog
                .link_weight_to_paper_type(&admin, light.id, gloss.id)
                .expect("link should succeed")
        );
        let a5 = catalog
            .add_paper_size(
                &admin,
                "A5",
                SizeSeries::A,
                Millimeters::whole(148),
                Millimeters::whole(210),
                &[heavy.id],
            )
            .expect("size should add");
        catalog
            .set_specification(
                &admin,
                ProductTypeSpecification {
                    product_type_id: flyers.id,
                    paper_type_ids: BTreeSet::from([gloss.id]),
                    paper_weight_ids: BTreeSet::from([light.id]),
                    paper_size_ids: BTreeSet::from([a5.id]),
                },
            )
            .expect("specification should set");

        let browse = grant(Role::Clerk, Capability::BrowseCatalog);
        let weights = catalog
            .compatible_weights(&browse, gloss.id)
            .expect("weights should load");
        assert_eq!(
            weights.iter().map(|w| w.gsm).collect::<Vec<_>>(),
            vec![130, 300]
        );
        let sizes = catalog
            .compatible_sizes(&browse, Some(light.id))
            .expect("sizes should load");
        assert!(sizes.is_empty());
        let spec = catalog
            .specification_for(&browse, flyers.id)
            .expect("specification should load");
        assert_eq!(
            spec.paper_weights.iter().map(|w| w.id).collect::<Vec<_>>(),
            vec![light.id]
        );
        assert_eq!(spec.paper_sizes[0].name, "A5");
    }

    #[test]
    fn non_superuser_cannot_administer() {
        let path = temp_ledger_path("forbidden");
        let catalog = PaperCatalog::new(&path);
        let designer = grant(Role::Designer, Capability::CreateCustomSize);
        let err = catalog
            .add_paper_type(&designer, "Bond", "")
            .expect_err("designer must not administer");
        assert!(matches!(err, CatalogError::Forbidden(_)));
        assert!(!path.exists());
    }

    #[test]
    fn duplicate_names_surface_as_conflict() {
        let catalog = PaperCatalog::new(temp_ledger_path("dup"));
        let admin = admin();
        catalog
            .add_paper_type(&admin, "Bond", "")
            .expect("first add should succeed");
        match catalog.add_paper_type(&admin, "bond", "") {
            Err(CatalogError::Conflict(message)) => assert!(message.contains("bond")),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn custom_size_resolution_is_persisted_once() {
        let path = temp_ledger_path("custom");
        let catalog = PaperCatalog::new(&path);
        let admin = admin();
        catalog
            .add_paper_type(&admin, "Gloss", "")
            .expect("paper type should add");
        let weight = catalog
            .add_paper_weight(&admin, 170, &[1])
            .expect("weight should add");

        let operator = grant(Role::Operator, Capability::CreateCustomSize);
        let first = catalog
            .resolve_or_create_size(&operator, &CustomSizeRequest::new("500", "700", weight.id))
            .expect("size should be created");
        let second = catalog
            .resolve_or_create_size(&operator, &CustomSizeRequest::new("700", "500", weight.id))
            .expect("size should resolve");
        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.size.id, second.size.id);

        let ledger = read_ledger_jsonl(&path).expect("ledger should reload");
        assert_eq!(ledger.paper_sizes().count(), 1);
    }

    #[test]
    fn seeding_through_the_handle_is_idempotent() {
        let path = temp_ledger_path("seed");
        let catalog = PaperCatalog::new(&path);
        let admin = admin();
        let first = catalog
            .seed_standard_sizes(&admin)
            .expect("seed should succeed");
        assert!(first.changed());
        let second = catalog
            .seed_standard_sizes(&admin)
            .expect("reseed should succeed");
        assert!(!second.changed());
    }
}
