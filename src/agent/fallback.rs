use std::time::{Duration, Instant};

use super::registry::{AgentId, AgentRegistry};
use crate::error::CoreResult;

/// Displayable stand-in for a live completion, built when the backend is unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackResult {
    pub agent: AgentId,
    pub query: String,
    pub text: String,
    pub latency: Duration,
    pub data_points: u32,
    pub confidence: u8,
}

struct Exemplar {
    key: &'static str,
    body: &'static str,
    data_points: u32,
    confidence: u8,
}

const GENERIC: Exemplar = Exemplar {
    key: "",
    body: "/// AGENT PROCESSING COMPLETE ///",
    data_points: 1000,
    confidence: 95,
};

/// Builds the fallback for `agent`. The body depends only on the agent; `query` is
/// carried as a label and `started` marks when the caller began the attempt.
pub fn synthesize(
    registry: &AgentRegistry,
    agent: AgentId,
    query: &str,
    started: Instant,
) -> CoreResult<FallbackResult> {
    let profile = registry.get(agent)?;
    let exemplar = EXEMPLARS
        .iter()
        .find(|exemplar| exemplar.key == profile.key)
        .unwrap_or(&GENERIC);

    Ok(FallbackResult {
        agent,
        query: query.trim().to_string(),
        text: exemplar.body.to_string(),
        latency: started.elapsed(),
        data_points: exemplar.data_points,
        confidence: exemplar.confidence,
    })
}

const EXEMPLARS: [Exemplar; 5] = [
    Exemplar {
        key: "costing",
        body: COSTING_BODY,
        data_points: 1247,
        confidence: 98,
    },
    Exemplar {
        key: "moq",
        body: MOQ_BODY,
        data_points: 892,
        confidence: 75,
    },
    Exemplar {
        key: "timeline",
        body: TIMELINE_BODY,
        data_points: 1156,
        confidence: 95,
    },
    Exemplar {
        key: "inventory",
        body: INVENTORY_BODY,
        data_points: 2341,
        confidence: 87,
    },
    Exemplar {
        key: "cashflow",
        body: CASHFLOW_BODY,
        data_points: 1893,
        confidence: 92,
    },
];

const COSTING_BODY: &str = r#"BOM CALCULATION RESULT
═══════════════════════════════════════════════
PRODUCT: HOODIE
SUPPLIER: EcoKnits-Tirupur (India)
ORDER: 500 units

COST BREAKDOWN (PER UNIT):

FABRIC:
  Consumption: 2.60m (with shrinkage + waste)
  Cost: 2.60m × $5.80/m = $15.08

TRIMS:
  Drawcord: $0.18
  Cord locks: $0.10
  Labels: $0.23
  Total Trims: $0.51

LABOR:
  SMV: 35 minutes
  Rate: $0.65/min
  Cost: 35 × $0.65 = $22.75

OVERHEAD & PROFIT:
  Factory overhead (16%): $6.13
  Factory profit (10%): $4.45

FOB COST: $48.92/unit

LANDED COST ADDITIONS:
  Freight (India): $3.60/unit
  Duty (16.0%): $7.83
  Customs broker: $0.25
  Receiving: $0.60
  QC inspection: $0.40

LANDED COST: $61.60/unit

PRICING RECOMMENDATIONS:

DTC (Direct-to-Consumer):
  Retail Price: $172.48
  Gross Margin: 64.3%

Premium Positioning:
  Retail Price: $246.40
  Gross Margin: 75.0%

TOTAL ORDER VALUE (500 units):
FOB Total: $24,460.00
Landed Total: $30,800.00
DTC Revenue Potential: $86,240.00
Premium Revenue Potential: $123,200.00"#;

const MOQ_BODY: &str = r#"MOQ NEGOTIATION STRATEGY
═══════════════════════════════════════════════
ANALYSIS: 5 styles, $15K budget, August timing

RECOMMENDED SUPPLIER: EcoKnits-Tirupur

BASE MOQ SCENARIO:
  Standard MOQ: 300 units/style
  Total Required: 1,500 units
  Total Cost: $73,500 (OVER BUDGET)

STRATEGY STACK:

1. Multi-Style Commitment (-40%)
   Commit to 5 styles simultaneously
   Reduction: 300 → 180 units/style

2. Off-Peak Timing (-25%)
   August = low season
   Reduction: 180 → 135 units/style

3. Prepayment Leverage (-20%)
   50% upfront payment
   Reduction: 135 → 108 units/style

FINAL NEGOTIATED MOQ: 113 units/style
Total Order: 565 units (62% reduction)
Total Cost: $27,677 (within budget)

SUCCESS PROBABILITY: 75%
ESTIMATED SAVINGS: $45,823

NEXT STEPS:
1. Contact supplier with multi-style proposal
2. Offer 50% prepayment
3. Emphasize August timing advantage"#;

const TIMELINE_BODY: &str = r#"PRODUCTION TIMELINE
═══════════════════════════════════════════════
ORDER: 500 hoodies
SUPPLIER: EcoKnits-Tirupur
TARGET LAUNCH: October 1

CRITICAL PATH:

Week 1-2 (14 days): Tech Pack & Fabric Procurement
  - Tech pack finalization
  - Fabric swatch approval
  - Yarn procurement

Week 3-4 (14 days): Sampling
  - Pre-production sample (PPS)
  - First article inspection (FAI)
  - Approval + revision round

Week 5-9 (35 days): Bulk Production
  - Cutting & sewing
  - Quality gates: inline 20%, 50%, 80%
  - Final random inspection (FRI)

Week 9 (3 days): Final QC
  - AQL 2.5 inspection
  - Third-party audit: $300

Week 10-12 (21 days): Shipping
  - India → NYC sea freight: 18 days
  - Customs clearance: 3 days

TOTAL TIMELINE: 87 days (12.4 weeks)
RECOMMENDED START: June 28
DELIVERY DATE: September 23
BUFFER: 8 days before launch

RISK FACTORS:
  - Monsoon season (June-Sept): add 1 week buffer
  - Port congestion: possible 3-5 day delay"#;

const INVENTORY_BODY: &str = r#"INVENTORY ALLOCATION
═══════════════════════════════════════════════
PRODUCT: 500 hoodies
FIT: Athletic
DEMOGRAPHIC: Urban

SIZE CURVE (Athletic M/L Bias):
  XS: 15 units (3%)
  S: 80 units (16%)
  M: 170 units (34%)
  L: 150 units (30%)
  XL: 65 units (13%)
  XXL: 20 units (4%)

COLOR DISTRIBUTION (Neutral-Heavy):
  Black: 200 units (40%)
  Grey: 175 units (35%)
  Olive: 125 units (25%)

TOTAL SKUs: 18 (3 colors × 6 sizes)

HIGH-PRIORITY SKUs (70% of sales):
  - Black M: 68 units
  - Black L: 60 units
  - Grey M: 60 units
  - Grey L: 52 units

REORDER TRIGGERS:
  M sizes: Reorder at 19 units (6-week lead time)
  L sizes: Reorder at 17 units
  Total: Reorder when 36 units remain

DEAD STOCK RISKS (2 SKUs):
  - XS Olive: 4 units (>20 weeks inventory)
  - XXL Olive: 3 units
  Recommendation: Markdown at week 8-10

SELL-THROUGH FORECAST:
  Month 1: 150 units (30%)
  Month 2: 175 units (35%)
  Month 3: 125 units (25%)
  Month 4+: 50 units (10%)"#;

const CASHFLOW_BODY: &str = r#"CASH FLOW PROJECTION
═══════════════════════════════════════════════
STARTUP: $25K budget
ORDER: 500 units @ $61.60 landed cost
RETAIL: $172.48 DTC

PAYMENT SCHEDULE:

Month -4: Sampling
  Tech pack: -$500
  Samples: -$1,500
  Cash Position: $23,000

Month -2: Production Deposit (40%)
  Deposit: -$12,320
  Marketing setup: -$2,000
  Cash Position: $8,680

Month -1: Balance Payment (60%)
  Balance: -$18,480
  Freight: -$1,800
  Marketing: -$5,000
  Cash Position: -$16,600 (NEED $16,600 MORE)

Month 0: Launch
  Receiving: -$300
  QC: -$400
  Sales: +$12,936 (75 units × $172.48)
  Cash Position: -$4,364

Month 1: Growth
  Sales: +$25,872 (150 units)
  Shopify fees: -$751
  Marketing: -$3,000
  Cash Position: +$17,757

Month 2: BREAKEVEN
  Sales: +$30,184 (175 units)
  Shopify fees: -$875
  Cash Position: +$47,066

ANALYSIS:
  Total Capital Needed: $41,600 (not $25K)
  Breakeven: Month 2 (175 units sold)
  Reorder Affordable: Month 2
  Critical Gap: Month -1 requires $16.6K bridge

RECOMMENDATIONS:
1. Secure $17K bridge financing
2. Consider smaller initial order (300 units)
3. Pre-orders to offset deposit"#;
