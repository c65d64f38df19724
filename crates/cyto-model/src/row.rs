/// Gate name both instruments reserve for the ungated total of a DataSet.
pub const GATE_ALL: &str = "All";

/// One data row of a Kaluza flow-cytometer CSV export.
///
/// `data_set` is the instrument-assigned composite identifier. The
/// acquisition protocol names it `Antibody<sep>Stimulation<sep>Subject`,
/// optionally followed by `-<timestamp>` appended by the acquisition
/// software. All values are kept verbatim; numeric cells use the export
/// locale (comma decimal separator).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KaluzaRow {
    pub data_set: String,
    /// Gate name for this row. `"All"` is the reserved ungated total.
    pub gate: String,
    pub pct_gated: String,
    pub x_med: String,
    pub x_amean: String,
    pub x_gmean: String,
}

/// One data row of a microvesicles panel CSV export.
///
/// `data_set` encodes `Sample_Subject` with `_` separators; the subject
/// identifier is the final token. Numeric cells use the export locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VesicleRow {
    pub data_set: String,
    /// Measured parameter; rows sharing a parameter belong to one group.
    pub x_parameter: String,
    /// Gate name for this row. `"All"` is the reserved ungated total.
    pub gate: String,
    pub number: String,
    pub pct_gated: String,
    pub cells_per_ul: String,
}
