// Representative allele sampling for the first pass.

use rand::Rng;

use crate::database::GeneMap;
use crate::error::{Error, Result};

/// Pick `k` alleles per gene, uniformly at random with replacement, and
/// return them as a reduced reference set keyed `gene.allele`.
///
/// Which allele represents a gene is intentionally not deterministic; the
/// invariant is that every gene contributes exactly `k` entries. Fails with
/// `EmptyGene` if a gene has no alleles to draw from.
pub fn sample(database: &GeneMap, k: usize) -> Result<Vec<(String, Vec<u8>)>> {
    let mut rng = rand::thread_rng();
    let mut representatives = Vec::with_capacity(database.len() * k);
    for (gene, alleles) in database {
        if alleles.is_empty() {
            return Err(Error::EmptyGene { gene: gene.clone() });
        }
        let ids: Vec<&String> = alleles.keys().collect();
        for _ in 0..k {
            let allele = ids[rng.gen_range(0..ids.len())];
            representatives.push((format!("{gene}.{allele}"), alleles[allele].clone()));
        }
    }
    Ok(representatives)
}
