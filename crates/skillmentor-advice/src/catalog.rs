use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use skillmentor_core::{Category, Error, Result};

/// Placeholder substituted with the selected advice in response templates.
pub const ADVICE_PLACEHOLDER: &str = "{advice}";

/// Sector-specific line appended when the query mentions one of `markers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub name: String,
    pub markers: Vec<String>,
    pub lines: Vec<String>,
}

/// Closing sentence appended when any query term starts with one of `terms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingRemark {
    pub terms: Vec<String>,
    pub text: String,
}

/// Every piece of canned text the advice pipeline draws from.
///
/// Built once at startup and shared read-only. A JSON catalog file may
/// replace any subset of the fields; missing fields keep the built-in data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceCatalog {
    pub pools: BTreeMap<Category, Vec<String>>,
    pub templates: Vec<String>,
    pub business: Vec<BusinessProfile>,
    pub closings: Vec<ClosingRemark>,
}

impl Default for AdviceCatalog {
    fn default() -> Self { Self::builtin() }
}

impl AdviceCatalog {
    pub fn builtin() -> Self {
        let pools = [
            (Category::Pricing, PRICING),
            (Category::Marketing, MARKETING),
            (Category::Sustainability, SUSTAINABILITY),
            (Category::Production, PRODUCTION),
            (Category::General, GENERAL),
        ]
        .into_iter()
        .map(|(c, pool)| (c, owned(pool)))
        .collect();
        let business = BUSINESS
            .iter()
            .map(|(name, markers, lines)| BusinessProfile { name: name.to_string(), markers: owned(markers), lines: owned(lines) })
            .collect();
        let closings = CLOSINGS
            .iter()
            .map(|(terms, text)| ClosingRemark { terms: owned(terms), text: text.to_string() })
            .collect();
        Self { pools, templates: owned(TEMPLATES), business, closings }
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(raw).map_err(|e| Error::InvalidConfig(format!("advice catalog: {}", e)))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Storage(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::from_json_str(&raw)?;
        info!(path = %path.display(), "loaded advice catalog");
        Ok(catalog)
    }

    /// Built-in catalog, or the file at `path` when one is configured.
    pub fn builtin_or_file(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::builtin()),
        }
    }

    /// Every category needs a non-empty pool of non-blank advice, and every
    /// template must carry the advice placeholder.
    pub fn validate(&self) -> Result<()> {
        for category in Category::ALL {
            let pool = self.pool(category);
            if pool.is_empty() {
                return Err(Error::InvalidConfig(format!("advice pool for '{}' is empty", category)));
            }
            if pool.iter().any(|a| a.trim().is_empty()) {
                return Err(Error::InvalidConfig(format!("advice pool for '{}' contains blank entries", category)));
            }
        }
        if self.templates.is_empty() {
            return Err(Error::InvalidConfig("no response templates".into()));
        }
        if let Some(t) = self.templates.iter().find(|t| !t.contains(ADVICE_PLACEHOLDER)) {
            return Err(Error::InvalidConfig(format!("template without {}: {}", ADVICE_PLACEHOLDER, t)));
        }
        if let Some(b) = self.business.iter().find(|b| b.markers.is_empty() || b.lines.is_empty()) {
            return Err(Error::InvalidConfig(format!("business profile '{}' needs markers and lines", b.name)));
        }
        Ok(())
    }

    pub fn pool(&self, category: Category) -> &[String] {
        self.pools.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn owned(items: &[&str]) -> Vec<String> { items.iter().map(|s| s.to_string()).collect() }

const PRICING: &[&str] = &[
    "Calculate your base price using the formula: (Material Cost + Labor Cost) × (1 + Profit Margin). For artisan products, aim for a 30-50% margin to reflect your craftsmanship value.",
    "Implement tiered pricing strategies based on product complexity and quality levels. Offer entry-level products alongside premium versions to attract different customer segments.",
    "Research local market rates carefully and position your pricing slightly above competitors if your quality justifies it. Undercutting devalues your craftsmanship and creates unsustainable expectations.",
    "Consider seasonal pricing adjustments - slightly higher during peak demand periods and promotional discounts during slower periods to maintain cash flow.",
    "Calculate your hourly labor rate realistically by tracking all production time (including preparation and finishing) and factor in your skill level and experience.",
    "Price your products to reflect the unique value of handmade items. Remember that customers seeking artisanal goods are often willing to pay premium prices for quality and authenticity.",
    "Use psychological pricing techniques such as charm pricing (ending prices with .95 or .99) for lower-cost items and round pricing for premium products to signal quality.",
    "Create a clear pricing structure that accounts for different sizes, materials, complexity levels, and customization options to maintain consistent profit margins.",
    "Consider using cost-plus pricing for standard items and value-based pricing for unique signature pieces, ensuring your most distinctive work commands appropriate prices.",
];

const MARKETING: &[&str] = &[
    "Build personal connections through storytelling - document your production process with photos and share the cultural significance of your craft on product tags and brochures.",
    "Create a 'Customer Referral Program' offering small discounts or bonus items when existing customers bring new customers to you, leveraging word-of-mouth marketing.",
    "Collaborate with complementary local businesses for cross-promotion. For example, if you make food products, partner with local restaurants to showcase your items.",
    "Create simple yet professional product displays using locally available materials that reflect your brand aesthetic. Good presentation increases perceived value.",
    "Host small workshops teaching basic skills related to your craft. This builds community connections, positions you as an expert, and creates additional income streams.",
    "Develop a signature style or technique that makes your products instantly recognizable. This becomes your visual brand identity in the marketplace.",
    "Participate in local markets, fairs, and community events where your target customers gather. Direct selling builds trust and provides immediate customer feedback.",
    "Create a simple brochure or catalog that tells your story and showcases your products with high-quality photographs. Even a well-designed single page can be effective.",
    "Collect testimonials from satisfied customers and display them prominently at your point of sale. Customer stories are powerful endorsements for potential buyers.",
];

const SUSTAINABILITY: &[&str] = &[
    "Source raw materials within a 50km radius where possible to minimize transportation emissions and support the local economy. Document this journey as part of your brand story.",
    "Implement a closed-loop production system: identify your waste streams and find creative ways to upcycle them into additional products or return them to production.",
    "Conserve energy by planning production activities around natural daylight hours and grouping energy-intensive tasks to minimize equipment startup/shutdown cycles.",
    "Create a product take-back program where customers can return packaging or worn-out products for recycling or upcycling, building brand loyalty while reducing waste.",
    "Develop relationships with sustainable suppliers who align with your values. Verify their practices through site visits when possible and highlight these partnerships in your marketing.",
    "Use natural water capture and storage systems like rain barrels for non-potable production needs such as cleaning equipment or watering gardens that provide materials.",
    "Switch to biodegradable or compostable packaging made from locally available materials - banana leaves, recycled paper, or cloth bags often cost less than plastic alternatives.",
    "Calculate the carbon footprint of your production process and identify the highest impact areas. Often small changes like equipment maintenance can significantly reduce emissions.",
    "Join or create a local artisan cooperative to share resources, reduce individual costs, and decrease the overall environmental impact of your production processes.",
];

const PRODUCTION: &[&str] = &[
    "Map your entire production process step-by-step and identify bottlenecks. Often, reorganizing your workspace to minimize movement between stations can increase productivity by 15-20%.",
    "Create detailed quality control checklists for each product type based on the best examples in your region. Train yourself to evaluate items objectively against these standards.",
    "Invest in multi-purpose tools rather than specialized equipment when starting out. The ideal tools can perform 2-3 different functions while maintaining quality.",
    "Schedule batch production days focused on similar products to minimize setup/cleanup time and take advantage of workflow efficiencies.",
    "Document your production methods (photos/video if possible) to create standardized processes. This ensures consistent quality and makes it easier to train others if you expand.",
    "Develop a simple inventory management system for materials using minimal technology - a whiteboard or notebook with clear reorder points prevents production delays.",
    "Create templates or jigs for repetitive tasks to increase consistency and speed without sacrificing quality. Even simple guides can dramatically improve efficiency.",
    "Learn to identify and eliminate the 7 wastes in production: transport, inventory, motion, waiting, overproduction, overprocessing, and defects.",
    "Protect your health by establishing proper ergonomics in your workspace - correct table heights, adequate lighting, and scheduled breaks prevent injuries and maintain productivity.",
];

const GENERAL: &[&str] = &[
    "Build a simple inventory management system using color-coded cards or a notebook to track stock levels. Set reorder points for materials to avoid production delays.",
    "Diversify your product offerings around core skill sets to create multiple income streams throughout the year. Consider seasonal product variations and complementary items.",
    "Maintain detailed records of customer preferences and purchase history, even if just in a notebook. This allows for personalized follow-up and helps identify your most profitable products.",
    "Invest time in learning basic business numeracy - understanding profit margins, break-even points, and simple cash flow projections will significantly improve decision-making.",
    "Create a business continuity plan addressing common risks in your area (weather events, supply chain disruptions, etc.). Having backup suppliers and emergency funds reduces vulnerability.",
    "Separate business and personal finances completely, even if just using dedicated jars or envelopes. This clarity is essential for understanding true business performance.",
    "Develop a monthly cash flow planning system that accounts for seasonal variations in both income and expenses. This prevents financial stress during predictable slow periods.",
    "Build relationships with other micro-entrepreneurs to share knowledge and resources. These networks often lead to new business opportunities and emotional support.",
    "Allocate specific time blocks for production, business management, and creative development. Without this structure, administrative tasks often get neglected.",
];

const TEMPLATES: &[&str] = &[
    "Based on my analysis of successful micro-entrepreneurs in your sector, {advice} This approach has shown a 30% increase in customer retention for similar businesses.",
    "I've examined sustainable business practices for your situation, and recommend: {advice} This strategy aligns with both profitability and environmental responsibility.",
    "Looking at your specific question, the most effective approach would be to {advice} Many artisans have found this method particularly successful in similar market conditions.",
    "After analyzing various business models for your context, I recommend: {advice} This strategy balances immediate practicality with long-term sustainability.",
    "My analysis suggests that your priority should be to {advice} This targeted approach addresses your specific challenge while supporting overall business growth.",
    "From studying successful entrepreneurs with similar challenges, I recommend you {advice} This method has consistently shown positive results in resource-constrained environments.",
    "The data indicates that your best strategy would be to {advice} This approach maximizes impact while minimizing resource investment - crucial for micro-enterprises.",
    "My recommendation based on market research is to {advice} This creates a meaningful competitive advantage that doesn't require significant capital investment.",
    "For your specific situation, the optimal approach is to {advice} This strategy addresses both immediate needs and long-term sustainability considerations.",
    "According to my analysis of successful business models in your sector, you should {advice} This approach has been validated through multiple case studies in similar markets.",
];

type BusinessEntry = (&'static str, &'static [&'static str], &'static [&'static str]);

const BUSINESS: &[BusinessEntry] = &[
    (
        "woodworking",
        &["wood", "carpentry", "furniture", "carve", "carving"],
        &[
            "For your woodworking business, highlight the sustainable sourcing of your timber and the durability of your products as key selling points.",
            "As a woodworker, consider offering repair services alongside new products to create recurring revenue and strengthen customer relationships.",
            "Woodworking businesses typically benefit from showcasing the entire creation process, as customers value seeing how raw timber becomes finished art.",
            "In your woodworking venture, emphasize the unique grain patterns and character of each piece to justify premium pricing for one-of-a-kind items.",
        ],
    ),
    (
        "textile",
        &["fabric", "textile", "cloth", "sew", "weave", "stitch"],
        &[
            "In your textile business, emphasizing traditional patterns or techniques can create a unique market position that attracts premium customers.",
            "For textile work, consider creating color story collections that encourage multiple purchases and coordinate with contemporary interior design trends.",
            "Your textile business could benefit from highlighting the tactile qualities of your fabrics through in-person experiences or detailed photography.",
            "As a textile artisan, showing the versatility of your creations through styling guides can increase perceived value and average purchase size.",
        ],
    ),
    (
        "food",
        &["food", "cook", "bake", "meal", "recipe"],
        &[
            "For your food business, documenting and sharing traditional preservation methods adds cultural value that customers are often willing to pay more for.",
            "Food enterprises should emphasize seasonal specialties to create anticipation and urgency, turning limited availability into a marketing advantage.",
            "In your food business, transparent sourcing information can justify premium pricing while building trust with increasingly conscious consumers.",
            "For specialty food products, offering pairing suggestions or serving recommendations adds value without increasing production costs.",
        ],
    ),
    (
        "farming",
        &["farm", "crop", "agriculture", "harvest", "plant"],
        &[
            "As a farmer, implementing crop rotation and companion planting can reduce pest problems while improving soil health, addressing two challenges simultaneously.",
            "Your farming enterprise could benefit from direct-to-consumer models like CSA subscriptions that improve cash flow predictability and reduce market volatility.",
            "For small-scale farming, focusing on high-value crops with shorter growing cycles can maximize land productivity and improve annual returns.",
            "In your agricultural business, creating value-added products from seconds or surplus can significantly increase profit margins compared to selling raw produce.",
        ],
    ),
];

const CLOSINGS: &[(&[&str], &str)] = &[
    (&["cost", "price", "profit"], "Remember that accurate pricing is fundamental to sustainable business growth."),
    (&["customer", "market", "sell"], "Building strong customer relationships will be key to your long-term success."),
    (&["quality", "improve"], "Consistent quality will set you apart in an increasingly competitive marketplace."),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = AdviceCatalog::builtin();
        catalog.validate().unwrap();
        assert!(Category::ALL.iter().all(|c| catalog.pool(*c).len() == 9));
        assert_eq!(catalog.templates.len(), 10);
    }

    #[test]
    fn partial_json_keeps_builtin_fields() {
        let catalog = AdviceCatalog::from_json_str(
            r#"{"pools": {"pricing": ["a"], "marketing": ["b"], "sustainability": ["c"], "production": ["d"], "general": ["e"]}}"#,
        )
        .unwrap();
        assert_eq!(catalog.pool(Category::Marketing), ["b".to_string()]);
        assert_eq!(catalog.templates.len(), 10);
    }

    #[test]
    fn missing_pool_is_rejected() {
        let err = AdviceCatalog::from_json_str(r#"{"pools": {"pricing": ["a"]}}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
