/// A column major matrix, as the OKLab constants are published.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ColMatrix(pub(crate) [[f64; 3]; 3]);

/// A row major matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RowMatrix(pub(crate) [f64; 9]);

#[rustfmt::skip]
impl ColMatrix {
    pub(crate) fn mul_vec(&self, vec: [f64; 3]) -> [f64; 3] {
        let ColMatrix(m) = self;
        let [a, b, c] = vec;

        [
            a*m[0][0] + b*m[1][0] + c*m[2][0],
            a*m[0][1] + b*m[1][1] + c*m[2][1],
            a*m[0][2] + b*m[1][2] + c*m[2][2],
        ]
    }
}

impl RowMatrix {
    pub(crate) const fn new(rows: [f64; 9]) -> RowMatrix {
        RowMatrix(rows)
    }

    pub(crate) fn mul_vec(&self, vec: [f64; 3]) -> [f64; 3] {
        let dot = |row: &[f64]| row.iter().zip(vec).map(|(r, c)| r * c).sum();
        [dot(&self.0[0..3]), dot(&self.0[3..6]), dot(&self.0[6..9])]
    }
}

#[test]
fn row_and_column_order_agree() {
    #[rustfmt::skip]
    let rows = RowMatrix::new([
        1.0, 2.0, 3.0,
        4.0, 5.0, 6.0,
        7.0, 8.0, 9.0,
    ]);
    let cols = ColMatrix([[1.0, 4.0, 7.0], [2.0, 5.0, 8.0], [3.0, 6.0, 9.0]]);

    assert_eq!(rows.mul_vec([1.0, 0.0, 0.0]), [1.0, 4.0, 7.0]);
    assert_eq!(cols.mul_vec([0.0, 1.0, 1.0]), rows.mul_vec([0.0, 1.0, 1.0]));
}
