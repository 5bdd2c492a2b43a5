/// Settings shared by all hardware providers
#[derive(Debug, Clone)]
pub struct HardwareConfig {
    /// Where the hardware is installed, included in every report
    pub site: String,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        HardwareConfig {
            site: "workbench".to_string(),
        }
    }
}
