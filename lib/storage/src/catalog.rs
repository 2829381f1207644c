use ahash::AHashMap;
use async_trait::async_trait;
use outfitx_core::{Error, Filter, ProductFilter, ProductRecord, Result, Vector, VectorStore};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

/// In-memory product catalog with exact L2 nearest-neighbour search
pub struct CatalogStore {
    vector_dim: usize,
    products: RwLock<AHashMap<String, ProductRecord>>,
    dirty: AtomicBool,
}

impl CatalogStore {
    pub fn new(vector_dim: usize) -> Self {
        Self {
            vector_dim,
            products: RwLock::new(AHashMap::new()),
            dirty: AtomicBool::new(false),
        }
    }

    pub fn vector_dim(&self) -> usize {
        self.vector_dim
    }

    pub fn count(&self) -> usize {
        self.products.read().len()
    }

    /// Number of records that can take part in a search
    pub fn embedded_count(&self) -> usize {
        self.products
            .read()
            .values()
            .filter(|p| p.embedding.is_some())
            .count()
    }

    /// Insert or replace a product
    pub fn upsert(&self, product: ProductRecord) -> Result<()> {
        if let Some(embedding) = &product.embedding {
            self.check_dim(embedding)?;
        }
        self.products.write().insert(product.id.clone(), product);
        self.dirty.store(true, AtomicOrdering::Release);
        Ok(())
    }

    /// Insert many products; stops at the first invalid one
    pub fn batch_upsert(&self, products: Vec<ProductRecord>) -> Result<()> {
        for product in &products {
            if let Some(embedding) = &product.embedding {
                self.check_dim(embedding)?;
            }
        }
        let mut map = self.products.write();
        for product in products {
            map.insert(product.id.clone(), product);
        }
        self.dirty.store(true, AtomicOrdering::Release);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<ProductRecord> {
        self.products.read().get(id).cloned()
    }

    pub fn delete(&self, id: &str) -> bool {
        let removed = self.products.write().remove(id).is_some();
        if removed {
            self.dirty.store(true, AtomicOrdering::Release);
        }
        removed
    }

    /// All records, ordered by id
    pub fn iter(&self) -> Vec<ProductRecord> {
        let mut all: Vec<ProductRecord> = self.products.read().values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Clear the dirty flag, returning whether anything changed since the last call
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, AtomicOrdering::AcqRel)
    }

    /// Flag the catalog as changed, e.g. after a failed save
    pub(crate) fn mark_dirty(&self) {
        self.dirty.store(true, AtomicOrdering::Release);
    }

    /// Closest `limit` records passing `filter`, ascending by distance then id
    pub fn search(
        &self,
        query: &Vector,
        limit: usize,
        filter: &dyn Filter,
    ) -> Result<Vec<(ProductRecord, f64)>> {
        self.check_dim(query)?;

        let products = self.products.read();
        let mut results: Vec<(&ProductRecord, f64)> = products
            .values()
            .filter(|product| filter.matches(product))
            .filter_map(|product| {
                let embedding = product.embedding.as_ref()?;
                Some((product, embedding.l2_distance(query)))
            })
            .collect();

        results.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });
        results.truncate(limit);

        Ok(results
            .into_iter()
            .map(|(product, distance)| (product.clone(), distance))
            .collect())
    }

    fn check_dim(&self, vector: &Vector) -> Result<()> {
        if vector.dim() != self.vector_dim {
            return Err(Error::InvalidDimension {
                expected: self.vector_dim,
                actual: vector.dim(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for CatalogStore {
    async fn nearest(
        &self,
        query: &Vector,
        limit: usize,
        filter: &ProductFilter,
    ) -> Result<Vec<(ProductRecord, f64)>> {
        self.search(query, limit, filter)
    }
}
