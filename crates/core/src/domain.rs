//! Keyword-based topic tagging for exam questions.

/// Domain name paired with the service keywords that indicate it.
///
/// Table order decides which domains win when a prompt mentions more than two.
const DOMAIN_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Compute",
        &["EC2", "Lambda", "ECS", "EKS", "Fargate", "Auto Scaling", "Elastic Beanstalk"],
    ),
    (
        "Storage",
        &["S3", "EBS", "EFS", "FSx", "Storage Gateway", "Snowball", "Glacier"],
    ),
    (
        "Database",
        &["RDS", "DynamoDB", "Aurora", "ElastiCache", "Redshift", "DocumentDB"],
    ),
    (
        "Networking",
        &[
            "VPC",
            "CloudFront",
            "Route 53",
            "Direct Connect",
            "VPN",
            "Transit Gateway",
            "API Gateway",
            "Load Balancer",
            "ALB",
            "NLB",
        ],
    ),
    (
        "Security",
        &[
            "IAM",
            "KMS",
            "Secrets Manager",
            "WAF",
            "Shield",
            "GuardDuty",
            "Certificate Manager",
            "ACM",
            "Security Group",
        ],
    ),
    (
        "Analytics",
        &["Athena", "Kinesis", "EMR", "Glue", "QuickSight", "OpenSearch"],
    ),
    ("Integration", &["SQS", "SNS", "EventBridge", "Step Functions"]),
    (
        "Management",
        &["CloudWatch", "CloudTrail", "Config", "Systems Manager", "Organizations"],
    ),
];

pub const GENERAL_DOMAIN: &str = "General";

const MAX_DOMAINS: usize = 2;

/// Up to two domains mentioned by `text`, or `["General"]`.
///
/// Matching is a case-insensitive substring test, so `S3` also matches inside
/// longer tokens.
#[must_use]
pub fn domains_for(text: &str) -> Vec<&'static str> {
    let upper = text.to_uppercase();
    let matched: Vec<&'static str> = DOMAIN_KEYWORDS
        .iter()
        .filter(|(_, keywords)| {
            keywords
                .iter()
                .any(|k| upper.contains(&k.to_uppercase()))
        })
        .map(|(domain, _)| *domain)
        .take(MAX_DOMAINS)
        .collect();

    if matched.is_empty() {
        vec![GENERAL_DOMAIN]
    } else {
        matched
    }
}

/// Every domain name a question can be tagged with, including `General`.
#[must_use]
pub fn all_domains() -> Vec<&'static str> {
    DOMAIN_KEYWORDS
        .iter()
        .map(|(domain, _)| *domain)
        .chain(std::iter::once(GENERAL_DOMAIN))
        .collect()
}
