//! Property-based tests for evaluation.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::context::CancelToken;
    use crate::evaluator::Evaluator;
    use crate::validate::validate;
    use termcalc_core::{Args, Document, TermField};
    use termcalc_value::NumericValue;

    fn call_at(doc: &Document, name: &str, x: f64) -> NumericValue {
        let report = validate(doc);
        let id = doc.find(name).map(|e| e.id).unwrap();
        let mut evaluator = Evaluator::new(doc, &report, CancelToken::new());
        evaluator.evaluate_call(id, &[NumericValue::real(x)]).unwrap()
    }

    proptest! {
        #[test]
        fn quadratic_derivative(a in -10.0f64..10.0, b in -10.0f64..10.0, x in -10.0f64..10.0) {
            // d/dx (a·x·x + b·x) = 2ax + b
            let mut doc = Document::new();
            let arena = doc.arena_mut();
            let arg = arena.argument("x");
            let ax = arena.mult(a.into(), arg);
            let axx = arena.mult(ax, arg);
            let bx = arena.mult(b.into(), arg);
            let body = arena.plus(axx, bx);
            let derivative = arena.derivative("x", body);
            doc.add_function("f", &["x"], derivative);

            let expected = 2.0 * a * x + b;
            let slope = call_at(&doc, "f", x);
            prop_assert!((slope.re() - expected).abs() <= 1e-9 * (1.0 + expected.abs()));
        }

        #[test]
        fn calls_substitute_arguments(x in -100.0f64..100.0, c in -100.0f64..100.0) {
            // g(y) := f(y + c) with f(x) := x·x
            let mut doc = Document::new();
            let arena = doc.arena_mut();
            let arg = arena.argument("x");
            let square = arena.mult(arg, arg);
            let y = arena.argument("y");
            let shifted = arena.plus(y, c.into());
            let call = arena.link("f", Args::from_iter([shifted]));
            doc.add_function("f", &["x"], square);
            doc.add_function("g", &["y"], call);

            let value = call_at(&doc, "g", x);
            prop_assert_eq!(value.re(), (x + c) * (x + c));
        }

        #[test]
        fn constant_summation(n in 1u32..500, c in -10.0f64..10.0) {
            let mut doc = Document::new();
            let sum = doc
                .arena_mut()
                .summation("i", 1.0.into(), f64::from(n).into(), TermField::from(c));
            doc.add_function("s", &["x"], sum);

            let value = call_at(&doc, "s", 0.0);
            let expected = f64::from(n) * c;
            prop_assert!((value.re() - expected).abs() <= 1e-9 * (1.0 + expected.abs()));
        }
    }
}
