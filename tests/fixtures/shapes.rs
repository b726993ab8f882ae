mod units;

const SIDES: u32 = 4;

pub trait Shape {
    fn area(&self) -> f64;
}

pub struct Square {
    side: f64,
}

impl Shape for Square {
    fn area(&self) -> f64 {
        self.side * self.side
    }
}

mod tests {
    fn unit_square() {}
}

fn main() {
    let square = Square { side: 2.0 };
    println!("{}", square.area());
}
