#[cfg(test)]
mod tests {
    use crate::calculator::{Calculator, CalculatorService, Outcome, DIVISION_BY_ZERO};
    use crate::proto::{CalculateRequest, Operation};
    use tokio_test::{assert_err, assert_ok};

    const SAMPLES: [f64; 9] = [0.0, -0.0, 1.0, -1.0, 0.5, 10.0, -7.25, 1e300, f64::MIN_POSITIVE];

    #[test]
    fn test_arithmetic_matches_ieee_for_finite_inputs() {
        let calculator = Calculator::new();

        for &a in &SAMPLES {
            for &b in &SAMPLES {
                assert_eq!(calculator.evaluate(a, b, Operation::Add), Outcome::Value(a + b));
                assert_eq!(
                    calculator.evaluate(a, b, Operation::Subtract),
                    Outcome::Value(a - b)
                );
                assert_eq!(
                    calculator.evaluate(a, b, Operation::Multiply),
                    Outcome::Value(a * b)
                );

                let expected = if b == 0.0 {
                    Outcome::DomainError(DIVISION_BY_ZERO.to_string())
                } else {
                    Outcome::Value(a / b)
                };
                assert_eq!(calculator.evaluate(a, b, Operation::Divide), expected);
            }
        }
    }

    #[test]
    fn test_non_finite_inputs_pass_through() {
        let calculator = Calculator::new();

        match calculator.evaluate(f64::NAN, 1.0, Operation::Add) {
            Outcome::Value(v) => assert!(v.is_nan()),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(
            calculator.evaluate(f64::INFINITY, 1.0, Operation::Multiply),
            Outcome::Value(f64::INFINITY)
        );
        match calculator.evaluate(f64::INFINITY, f64::INFINITY, Operation::Subtract) {
            Outcome::Value(v) => assert!(v.is_nan()),
            other => panic!("unexpected outcome: {:?}", other),
        }
        // overflow is not guarded either
        assert_eq!(
            calculator.evaluate(1e308, 10.0, Operation::Multiply),
            Outcome::Value(f64::INFINITY)
        );
        assert_eq!(
            calculator.evaluate(1.0, f64::INFINITY, Operation::Divide),
            Outcome::Value(0.0)
        );
    }

    #[test]
    fn test_repeated_requests_are_identical() {
        let service = CalculatorService::new();

        for op in Operation::ALL {
            let request = CalculateRequest::new(10.0, 4.0, op);
            let first = assert_ok!(service.calculate(&request));
            let second = assert_ok!(service.calculate(&request));
            assert_eq!(first, second);
        }

        let request = CalculateRequest::new(3.0, 0.0, Operation::Divide);
        assert_eq!(
            assert_ok!(service.calculate(&request)),
            assert_ok!(service.calculate(&request))
        );
    }

    #[test]
    fn test_end_to_end_scenarios() {
        let service = CalculatorService::new();

        let scenarios = [
            (Operation::Add, 5.0, 15.0),
            (Operation::Subtract, 5.0, 5.0),
            (Operation::Multiply, 5.0, 50.0),
            (Operation::Divide, 5.0, 2.0),
        ];
        for (op, b, expected) in scenarios {
            let response = assert_ok!(service.calculate(&CalculateRequest::new(10.0, b, op)));
            assert_eq!(response.result, expected, "10 {} {}", op, b);
            assert!(response.error.is_empty());
        }

        let response =
            assert_ok!(service.calculate(&CalculateRequest::new(10.0, 0.0, Operation::Divide)));
        assert_eq!(response.result, 0.0);
        assert_eq!(response.error, "division by zero");

        let invalid = CalculateRequest {
            a: 10.0,
            b: 5.0,
            op: 99,
        };
        assert_err!(service.calculate(&invalid));
    }
}
