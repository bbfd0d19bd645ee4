/// Region codes, in the form used as keys of `priceByRegion`, that the
/// multi-region queries iterate over. Order matters: it is the tie-break
/// order of the cheapest-region search.
pub const DEFAULT_REGIONS: &[&str] = &[
    "useast1",
    "useast4",
    "useast5",
    "uscentral1",
    "ussouth1",
    "uswest1",
    "uswest2",
    "uswest3",
    "uswest4",
    "northamericanortheast1",
    "northamericanortheast2",
    "southamericaeast1",
    "southamericawest1",
    "europecentral2",
    "europenorth1",
    "europesouthwest1",
    "europewest1",
    "europewest2",
    "europewest3",
    "europewest4",
    "europewest6",
    "europewest8",
    "europewest9",
    "europewest10",
    "europewest12",
    "mecentral1",
    "mecentral2",
    "mewest1",
    "africasouth1",
    "asiaeast1",
    "asiaeast2",
    "asianortheast1",
    "asianortheast2",
    "asianortheast3",
    "asiasouth1",
    "asiasouth2",
    "asiasoutheast1",
    "asiasoutheast2",
    "australiasoutheast1",
    "australiasoutheast2",
];

/// Owned copy of [`DEFAULT_REGIONS`]
pub fn default_regions() -> Vec<String> {
    DEFAULT_REGIONS.iter().map(|r| r.to_string()).collect()
}
