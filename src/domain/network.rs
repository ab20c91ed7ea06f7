/// Substrings whose presence in a Terraform patch marks it as a network change.
///
/// Matching is plain, case-sensitive containment, so generic words such as
/// `private` and `public` match inside unrelated identifiers too.
pub const NETWORK_TERMS: [&str; 39] = [
    "aws_vpc",
    "aws_subnet",
    "aws_subnet_association",
    "aws_route_table",
    "aws_route_table_association",
    "aws_default_route_table",
    "aws_internet_gateway",
    "aws_nat_gateway",
    "aws_eip",
    "aws_security_group",
    "aws_security_group_rule",
    "aws_network_acl",
    "aws_network_acl_rule",
    "aws_lb",
    "aws_alb",
    "aws_lb_listener",
    "aws_lb_target_group",
    "aws_lb_target_group_attachment",
    "aws_dx_gateway",
    "aws_dx_connection",
    "aws_vpn_gateway",
    "aws_customer_gateway",
    "aws_vpn_connection",
    "aws_transit_gateway",
    "aws_transit_gateway_vpc_attachment",
    "aws_transit_gateway_route",
    "aws_transit_gateway_route_table",
    "aws_vpc_endpoint",
    "aws_vpc_endpoint_service",
    "cidr_block",
    "ingress",
    "egress",
    "destination_cidr_block",
    "source_security_group_id",
    "availability_zone",
    "private",
    "public",
    "enable_dns_hostnames",
    "enable_dns_support",
];

/// A vocabulary of network-related terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkTerms {
    terms: &'static [&'static str],
}

impl Default for NetworkTerms {
    fn default() -> Self {
        Self {
            terms: &NETWORK_TERMS,
        }
    }
}

impl NetworkTerms {
    /// Whether any term occurs in `patch`.
    #[must_use]
    pub fn matches(&self, patch: &str) -> bool {
        self.terms.iter().any(|term| patch.contains(term))
    }

    /// Every term occurring in `patch`, in vocabulary order.
    #[must_use]
    pub fn matching(&self, patch: &str) -> Vec<&'static str> {
        self.terms
            .iter()
            .copied()
            .filter(|term| patch.contains(term))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("+resource \"aws_security_group\" \"web\" {"; "resource type")]
    #[test_case("+  cidr_block = \"10.0.0.0/16\""; "attribute")]
    #[test_case("+  name = \"my-private-bucket\""; "generic word inside identifier")]
    fn flags_network_terms(patch: &str) {
        assert!(NetworkTerms::default().matches(patch));
    }

    #[test_case(""; "empty patch")]
    #[test_case("+  bucket = \"logs\""; "unrelated change")]
    #[test_case("+  name = \"PRIVATE\""; "case sensitive")]
    fn ignores_other_changes(patch: &str) {
        assert!(!NetworkTerms::default().matches(patch));
    }

    #[test]
    fn matching_lists_every_term() {
        let terms = NetworkTerms::default().matching("resource \"aws_subnet\" \"a\" { availability_zone = \"x\" }");

        assert_eq!(terms, vec!["aws_subnet", "availability_zone"]);
    }

    #[test]
    fn custom_vocabulary() {
        let terms = NetworkTerms {
            terms: &["aws_route53_record"],
        };

        assert!(terms.matches("aws_route53_record"));
        assert!(!terms.matches("aws_vpc"));
    }
}
