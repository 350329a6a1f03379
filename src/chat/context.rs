//! Per-category prompt guidance.
//!
//! Each query category maps onto a fixed block of focus points that is
//! spliced into the system prompt. The mapping is a closed enum match,
//! so adding a category is a compile-time concern.

use crate::classify::QueryLabel;

const SAFETY: &str = "Focus on safety and risk mitigation:
- Required PPE and safety protocols
- Material handling guidelines
- Emergency procedures and first aid
- MSDS information and hazard warnings
- Environmental safety considerations
- Professional safety requirements";

const INSTALLATION: &str = "Focus on proper installation procedures:
- Step-by-step installation guides
- Required tools and equipment
- Industry best practices
- Common mistakes to avoid
- Environmental considerations
- Professional installation requirements
- Related technical specifications
- Quality control measures";

const SPECIFICATIONS: &str = "Focus on technical specifications:
- Material dimensions and tolerances
- Physical properties and performance data
- Testing certifications and standards
- Load ratings and structural capabilities
- Environmental performance ratings
- Installation requirements
- Compatibility specifications";

const COMPARISON: &str = "Focus on material comparisons:
- Performance characteristics
- Cost-benefit analysis
- Environmental impact
- Installation requirements
- Maintenance needs
- Lifespan expectations
- Regional considerations
- Alternative options";

const COMPLIANCE: &str = "Focus on regulatory requirements:
- Applicable building codes
- Industry standards
- Regional requirements
- Certification needs
- Documentation requirements
- Inspection guidelines
- Professional requirements";

const COMMERCIAL: &str = "Focus on procurement details:
- Current pricing and availability
- Bulk purchase options
- Lead times and logistics
- Warranty information
- Supplier details
- Regional availability
- Volume discounts";

const GENERAL: &str = "Provide comprehensive guidance:
- Product overview
- Key specifications
- Safety considerations
- Installation requirements
- Maintenance needs
- Alternative options
- Professional resources
- Regional considerations";

/// Guidance block for a classified query. `Other` falls back to the
/// general block; callers decide whether to include it at all.
pub fn guidance_for(label: QueryLabel) -> &'static str {
    match label {
        QueryLabel::Safety => SAFETY,
        QueryLabel::Installation => INSTALLATION,
        QueryLabel::Specifications => SPECIFICATIONS,
        QueryLabel::Comparison => COMPARISON,
        QueryLabel::Compliance => COMPLIANCE,
        QueryLabel::Commercial => COMMERCIAL,
        QueryLabel::General | QueryLabel::Other => GENERAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_label_has_guidance() {
        let labels = [
            QueryLabel::Safety,
            QueryLabel::Installation,
            QueryLabel::Specifications,
            QueryLabel::Comparison,
            QueryLabel::Compliance,
            QueryLabel::Commercial,
            QueryLabel::General,
            QueryLabel::Other,
        ];
        for label in labels {
            assert!(guidance_for(label).starts_with("Focus on") || guidance_for(label).starts_with("Provide"));
        }
    }

    #[test]
    fn other_shares_the_general_block() {
        assert_eq!(guidance_for(QueryLabel::Other), guidance_for(QueryLabel::General));
    }

    #[test]
    fn safety_covers_ppe() {
        assert!(guidance_for(QueryLabel::Safety).contains("PPE"));
    }
}
